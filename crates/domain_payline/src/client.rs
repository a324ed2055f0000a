//! Provider Client Port
//!
//! This module defines the port through which the gateway reaches the
//! Payline web services. The SDK or HTTP transport behind it is an adapter
//! concern; the gateway only sees the request structures below and the raw
//! answer the provider returns.
//!
//! # Error Channels
//!
//! Two channels are kept apart:
//!
//! - `Err(PortError)`: the call never produced a provider answer (network
//!   failure, timeout, undecodable body). Never written to a payment.
//! - `Ok(RawResponse)`: the provider answered. A refusal code is still an
//!   `Ok` and is interpreted by the classifier.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_payline::client::ProviderClient;
//! use std::sync::Arc;
//!
//! pub struct WalletManager {
//!     client: Arc<dyn ProviderClient>,
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use core_kernel::{DomainPort, HealthCheckable, OperationMetadata, PortError};
use domain_billing::{Address, Customer};

use crate::config::{Environment, GatewayConfiguration};

/// Payment action code for authorization with capture
pub const ACTION_AUTHORIZE_AND_CAPTURE: u16 = 101;

/// Private data key carrying the invoice id
pub const INVOICE_PRIVATE_KEY: &str = "id";

/// Result block present in every provider answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseResult {
    pub code: String,
    #[serde(default)]
    pub short_message: String,
    #[serde(default)]
    pub long_message: String,
}

/// Undecoded provider answer
///
/// Only the result block is typed; everything else is kept as sent so it
/// can be attached verbatim to the payment log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    pub result: ResponseResult,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl RawResponse {
    /// Creates an answer with an empty body
    pub fn new(
        code: impl Into<String>,
        short_message: impl Into<String>,
        long_message: impl Into<String>,
    ) -> Self {
        Self {
            result: ResponseResult {
                code: code.into(),
                short_message: short_message.into(),
                long_message: long_message.into(),
            },
            body: Map::new(),
        }
    }

    /// Adds a body field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.body.insert(key.into(), value);
        self
    }

    /// Full answer as JSON, result block included
    pub fn to_payload(&self) -> Value {
        let mut payload = self.body.clone();
        payload.insert(
            "result".to_string(),
            serde_json::json!({
                "code": self.result.code,
                "shortMessage": self.result.short_message,
                "longMessage": self.result.long_message,
            }),
        );
        Value::Object(payload)
    }
}

/// Postal address as the provider expects it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAddress {
    pub name: String,
    pub street1: String,
    pub street2: String,
    pub zip_code: String,
    pub city_name: String,
    pub country: String,
}

impl ProviderAddress {
    /// Builds the address from a customer's organisation address
    pub fn from_customer(customer: &Customer) -> Self {
        let address: &Address = &customer.address;
        Self {
            name: customer.business_name.clone(),
            street1: address.line1.trim().to_string(),
            street2: address.street2(),
            zip_code: address.zip_code.clone(),
            city_name: address.city.clone(),
            country: address.country.clone(),
        }
    }
}

/// Wallet holder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletHolder {
    pub wallet_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub comment: String,
    pub default: String,
    pub card_brand: String,
}

/// Card registered in a wallet
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    #[serde(rename = "type")]
    pub card_type: String,
    pub number: String,
    pub cvx: String,
    /// `MMYY`
    pub expiration_date: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_type", &self.card_type)
            .field("number", &"***")
            .field("cvx", &"***")
            .field("expiration_date", &self.expiration_date)
            .finish()
    }
}

/// Buyer block of a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_status: Option<String>,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Wallet creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    pub version: String,
    pub contract_number: String,
    pub wallet: WalletHolder,
    pub address: ProviderAddress,
    pub billing_address: ProviderAddress,
    pub owner_address: ProviderAddress,
    pub card: CardDetails,
    pub buyer: Buyer,
}

/// Wallet lookup request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchWalletRequest {
    pub contract_number: String,
    pub wallet_id: String,
    pub card_ind: String,
    pub version: String,
}

/// Payment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Part of a recurring billing relationship
    #[serde(rename = "REC")]
    Recurrent,
    /// Single transaction
    #[serde(rename = "CPT")]
    OneShot,
}

impl PaymentMode {
    pub fn from_recurrent(recurrent: bool) -> Self {
        if recurrent {
            PaymentMode::Recurrent
        } else {
            PaymentMode::OneShot
        }
    }

    /// Code sent to the provider
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMode::Recurrent => "REC",
            PaymentMode::OneShot => "CPT",
        }
    }
}

/// Payment block of a wallet payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    /// Minor units
    pub amount: i64,
    /// ISO 4217 numeric code, 3 digits
    pub currency: String,
    pub action: u16,
    pub mode: PaymentMode,
    pub contract_number: String,
    pub differed_action_date: String,
    pub soft_descriptor: String,
    pub card_brand: String,
}

/// Order block of a wallet payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(rename = "ref")]
    pub reference: String,
    pub origin: String,
    pub amount: i64,
    pub currency: String,
    pub country: String,
    /// `dd/mm/YYYY HH:MM` in the merchant timezone
    pub date: String,
}

/// Key/value pair forwarded to the provider back office
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateData {
    pub key: String,
    pub value: String,
}

/// Private data entries for the context of an operation, sorted by key
pub fn private_data(metadata: &OperationMetadata) -> Vec<PrivateData> {
    let mut entries: Vec<PrivateData> = metadata
        .context
        .iter()
        .map(|(key, value)| PrivateData {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    entries
}

/// Immediate payment on a stored wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImmediateWalletPaymentRequest {
    pub version: String,
    pub payment: PaymentDetails,
    pub order: OrderDetails,
    pub buyer: Buyer,
    pub wallet_id: String,
    pub wallet_cvx: String,
    pub card_ind: String,
    pub private_data: Vec<PrivateData>,
}

impl ImmediateWalletPaymentRequest {
    /// Invoice id carried in the private data
    pub fn invoice_reference(&self) -> Option<&str> {
        self.private_data
            .iter()
            .find(|d| d.key == INVOICE_PRIVATE_KEY)
            .map(|d| d.value.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Rejects a request without an invoice reference
    pub fn ensure_invoice_reference(&self) -> Result<&str, PortError> {
        self.invoice_reference().ok_or_else(|| PortError::Transformation {
            message: format!(
                "wallet payment for order {} has no '{}' private data",
                self.order.reference, INVOICE_PRIVATE_KEY
            ),
        })
    }
}

/// Credentials an adapter authenticates with
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub merchant_id: String,
    pub api_key: String,
    pub environment: Environment,
}

impl ProviderCredentials {
    pub fn from_config(config: &GatewayConfiguration) -> Self {
        Self {
            merchant_id: config.merchant_id.clone(),
            api_key: config.api_key.clone(),
            environment: config.environment,
        }
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("merchant_id", &self.merchant_id)
            .field("api_key", &"***")
            .field("environment", &self.environment)
            .finish()
    }
}

/// Port to the Payline wallet web services
#[async_trait]
pub trait ProviderClient: DomainPort + HealthCheckable {
    /// Registers a card under a new wallet id
    async fn create_wallet(&self, request: CreateWalletRequest) -> Result<RawResponse, PortError>;

    /// Reads a wallet and one of its cards
    async fn fetch_wallet(&self, request: FetchWalletRequest) -> Result<RawResponse, PortError>;

    /// Charges a stored wallet
    async fn execute_payment(
        &self,
        request: ImmediateWalletPaymentRequest,
    ) -> Result<RawResponse, PortError>;
}

/// Runs a provider call under a deadline
///
/// Expiry yields `PortError::Timeout`; the pending call is dropped.
pub async fn with_deadline<F>(
    operation: &str,
    limit: Duration,
    call: F,
) -> Result<RawResponse, PortError>
where
    F: Future<Output = Result<RawResponse, PortError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PortError::timeout(
            operation,
            limit.as_millis().try_into().unwrap_or(u64::MAX),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_response_deserializes_result_and_body() {
        let raw: RawResponse = serde_json::from_value(json!({
            "result": {"code": "00000", "shortMessage": "ACCEPTED", "longMessage": "Transaction approved"},
            "transaction": {"id": "T1"}
        }))
        .unwrap();

        assert_eq!(raw.result.code, "00000");
        assert_eq!(raw.body["transaction"]["id"], "T1");

        let payload = raw.to_payload();
        assert_eq!(payload["result"]["longMessage"], "Transaction approved");
        assert_eq!(payload["transaction"]["id"], "T1");
    }

    #[test]
    fn test_payment_mode_codes() {
        assert_eq!(PaymentMode::from_recurrent(true).code(), "REC");
        assert_eq!(PaymentMode::from_recurrent(false).code(), "CPT");
        assert_eq!(serde_json::to_value(PaymentMode::OneShot).unwrap(), json!("CPT"));
    }

    #[test]
    fn test_card_details_debug_is_redacted() {
        let card = CardDetails {
            card_type: "CB".to_string(),
            number: "4929550861981029".to_string(),
            cvx: "123".to_string(),
            expiration_date: "1225".to_string(),
        };
        let debug = format!("{:?}", card);
        assert!(!debug.contains("4929550861981029"));
        assert!(debug.contains("1225"));

        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["type"], "CB");
        assert_eq!(value["expirationDate"], "1225");
    }

    #[test]
    fn test_private_data_from_metadata() {
        let metadata = OperationMetadata::with_correlation_id("PAY-1")
            .with_context(INVOICE_PRIVATE_KEY, "INV-1")
            .with_context("attempt", "2");

        let entries = private_data(&metadata);
        assert_eq!(entries[0].key, "attempt");
        assert_eq!(entries[1].key, "id");
        assert_eq!(entries[1].value, "INV-1");
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let config = GatewayConfiguration::new("1234567", "secret", "CB-001", Environment::Production);
        let credentials = ProviderCredentials::from_config(&config);

        assert_eq!(credentials.environment.sdk_name(), "PROD");
        assert!(!format!("{:?}", credentials).contains("secret"));
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_a_timeout() {
        let result = with_deadline("create_wallet", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(RawResponse::new("02500", "", ""))
        })
        .await;

        match result {
            Err(PortError::Timeout { operation, duration_ms }) => {
                assert_eq!(operation, "create_wallet");
                assert_eq!(duration_ms, 10);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
