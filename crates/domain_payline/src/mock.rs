//! Mock implementation of ProviderClient for testing
//!
//! Answers from a script and records every request it receives. With
//! nothing scripted, each operation answers with its success code.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};

use crate::classifier::{OperationKind, PAYMENT_SUCCESS_CODE, WALLET_SUCCESS_CODE};
use crate::client::{
    CreateWalletRequest, FetchWalletRequest, ImmediateWalletPaymentRequest, ProviderClient,
    RawResponse,
};

/// Scripted outcome of one call
#[derive(Debug)]
pub enum MockReply {
    Respond(RawResponse),
    Fail(PortError),
}

#[derive(Debug, Default)]
struct MockState {
    replies: VecDeque<MockReply>,
    create_wallet_requests: Vec<CreateWalletRequest>,
    fetch_wallet_requests: Vec<FetchWalletRequest>,
    payment_requests: Vec<ImmediateWalletPaymentRequest>,
    outage: Option<String>,
}

/// In-memory mock of the Payline web services
#[derive(Debug, Default, Clone)]
pub struct MockProviderClient {
    state: Arc<RwLock<MockState>>,
    delay: Option<Duration>,
}

impl MockProviderClient {
    /// Creates a mock that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reports the adapter unhealthy until [`Self::set_healthy`] is called
    pub async fn set_unhealthy(&self, reason: impl Into<String>) {
        self.state.write().await.outage = Some(reason.into());
    }

    pub async fn set_healthy(&self) {
        self.state.write().await.outage = None;
    }

    /// Queues an answer for the next call
    pub async fn respond_with(&self, response: RawResponse) {
        self.state
            .write()
            .await
            .replies
            .push_back(MockReply::Respond(response));
    }

    /// Queues an answer carrying only a result block
    pub async fn respond_code(&self, code: &str, short_message: &str, long_message: &str) {
        self.respond_with(RawResponse::new(code, short_message, long_message))
            .await;
    }

    /// Queues a transport failure for the next call
    pub async fn fail_with(&self, error: PortError) {
        self.state
            .write()
            .await
            .replies
            .push_back(MockReply::Fail(error));
    }

    pub async fn create_wallet_requests(&self) -> Vec<CreateWalletRequest> {
        self.state.read().await.create_wallet_requests.clone()
    }

    pub async fn fetch_wallet_requests(&self) -> Vec<FetchWalletRequest> {
        self.state.read().await.fetch_wallet_requests.clone()
    }

    pub async fn payment_requests(&self) -> Vec<ImmediateWalletPaymentRequest> {
        self.state.read().await.payment_requests.clone()
    }

    /// Number of calls received across all operations
    pub async fn call_count(&self) -> usize {
        let state = self.state.read().await;
        state.create_wallet_requests.len()
            + state.fetch_wallet_requests.len()
            + state.payment_requests.len()
    }

    async fn reply(&self, operation: OperationKind) -> Result<RawResponse, PortError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.state.write().await.replies.pop_front() {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Fail(error)) => Err(error),
            None => Ok(default_reply(operation)),
        }
    }
}

fn default_reply(operation: OperationKind) -> RawResponse {
    match operation {
        OperationKind::CreateWallet | OperationKind::FetchWallet => {
            RawResponse::new(WALLET_SUCCESS_CODE, "OK", "Operation Successfull")
        }
        OperationKind::ExecutePayment => {
            RawResponse::new(PAYMENT_SUCCESS_CODE, "ACCEPTED", "Transaction approved")
        }
    }
}

impl DomainPort for MockProviderClient {}

#[async_trait]
impl HealthCheckable for MockProviderClient {
    async fn health_check(&self) -> HealthCheckResult {
        let (status, message) = match self.state.read().await.outage.clone() {
            Some(reason) => (AdapterHealth::Unhealthy, reason),
            None => (AdapterHealth::Healthy, "Mock adapter healthy".to_string()),
        };
        HealthCheckResult {
            adapter_id: "mock-payline-client".to_string(),
            status,
            latency_ms: 0,
            message: Some(message),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ProviderClient for MockProviderClient {
    async fn create_wallet(&self, request: CreateWalletRequest) -> Result<RawResponse, PortError> {
        self.state.write().await.create_wallet_requests.push(request);
        self.reply(OperationKind::CreateWallet).await
    }

    async fn fetch_wallet(&self, request: FetchWalletRequest) -> Result<RawResponse, PortError> {
        self.state.write().await.fetch_wallet_requests.push(request);
        self.reply(OperationKind::FetchWallet).await
    }

    async fn execute_payment(
        &self,
        request: ImmediateWalletPaymentRequest,
    ) -> Result<RawResponse, PortError> {
        request.ensure_invoice_reference()?;
        self.state.write().await.payment_requests.push(request);
        self.reply(OperationKind::ExecutePayment).await
    }
}
