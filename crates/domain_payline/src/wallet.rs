//! Wallet Manager
//!
//! Provisions the provider wallet a payment mean is charged through. A
//! payment mean gets its wallet exactly once, either by registering the card
//! entered in the form or by adopting a token obtained elsewhere.
//!
//! # Provisioning
//!
//! ```text
//! options.wallet_id given ──► adopt token, no provider call
//!            │
//!            └─ otherwise ──► validate form ──► new wallet id ──► create_wallet
//!                                                                    │
//!                                 02500 ──► store wallet_id + card_index
//!                                 other ──► GatewayError::Business, nothing stored
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use domain_billing::{BillingError, Customer, PaymentMean};

use crate::classifier::{classify, GatewayResponse, OperationKind};
use crate::client::{
    with_deadline, Buyer, CardDetails, CreateWalletRequest, FetchWalletRequest, ProviderAddress,
    ProviderClient, WalletHolder,
};
use crate::config::{GatewayConfiguration, WalletIdStrategy};
use crate::error::GatewayError;
use crate::schema::{CardForm, ValidatedCard};

/// Card index used when inspecting a wallet without an explicit one
pub const DEFAULT_INSPECTION_CARD_INDEX: &str = "1";

/// Card type registered with new wallets
const CARD_TYPE: &str = "CB";

/// Produces identifiers for new wallets
pub trait WalletIdSource: Send + Sync {
    fn next_wallet_id(&self, payment_mean: &PaymentMean, customer: &Customer) -> String;
}

/// Random UUID per wallet
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomWalletId;

impl WalletIdSource for RandomWalletId {
    fn next_wallet_id(&self, _payment_mean: &PaymentMean, _customer: &Customer) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Customer id followed by the random tail of the payment mean id
///
/// Wallets of one customer share a prefix, which lets the provider back
/// office group them.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerWalletId;

impl WalletIdSource for CustomerWalletId {
    fn next_wallet_id(&self, payment_mean: &PaymentMean, customer: &Customer) -> String {
        let customer_part = customer.id.as_uuid().simple().to_string();
        let mean_part = payment_mean.id.as_uuid().simple().to_string();
        format!("{}-{}", customer_part, &mean_part[20..])
    }
}

/// Wallet id source selected by a strategy
pub fn wallet_id_source(strategy: WalletIdStrategy) -> Arc<dyn WalletIdSource> {
    match strategy {
        WalletIdStrategy::Random => Arc::new(RandomWalletId),
        WalletIdStrategy::CustomerDerived => Arc::new(CustomerWalletId),
    }
}

/// Caller supplied provisioning options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletOptions {
    /// Token from an external tokenization flow
    pub wallet_id: Option<String>,
    /// Card index inside that wallet
    pub card_index: Option<String>,
    /// Deadline replacing the configured request timeout
    pub timeout: Option<Duration>,
}

impl WalletOptions {
    pub fn with_token(wallet_id: impl Into<String>) -> Self {
        Self {
            wallet_id: Some(wallet_id.into()),
            ..Self::default()
        }
    }

    pub fn with_card_index(mut self, card_index: impl Into<String>) -> Self {
        self.card_index = Some(card_index.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn token(&self) -> Option<&str> {
        self.wallet_id.as_deref().filter(|w| !w.trim().is_empty())
    }
}

/// Creates, adopts and inspects provider wallets
#[derive(Clone)]
pub struct WalletManager {
    client: Arc<dyn ProviderClient>,
    config: Arc<GatewayConfiguration>,
    wallet_ids: Arc<dyn WalletIdSource>,
}

impl WalletManager {
    /// Creates a manager using the wallet id source of the configured version
    pub fn new(client: Arc<dyn ProviderClient>, config: Arc<GatewayConfiguration>) -> Self {
        let wallet_ids = wallet_id_source(config.capabilities().wallet_id_strategy);
        Self {
            client,
            config,
            wallet_ids,
        }
    }

    /// Replaces the wallet id source
    pub fn with_wallet_ids(mut self, wallet_ids: Arc<dyn WalletIdSource>) -> Self {
        self.wallet_ids = wallet_ids;
        self
    }

    pub fn config(&self) -> &GatewayConfiguration {
        &self.config
    }

    /// Gives a payment mean its wallet.
    ///
    /// Either both `wallet_id` and `card_index` are stored or neither is.
    /// Calling this on a payment mean that already has a wallet is an error.
    #[instrument(skip(self, payment_mean, customer, form, options), fields(payment_mean_id = %payment_mean.id))]
    pub async fn ensure_wallet(
        &self,
        payment_mean: &mut PaymentMean,
        customer: &Customer,
        form: &CardForm,
        options: WalletOptions,
    ) -> Result<(), GatewayError> {
        if payment_mean.has_wallet() {
            return Err(BillingError::WalletAlreadyProvisioned(payment_mean.id.to_string()).into());
        }

        if let Some(token) = options.token() {
            let card_index = options.card_index.clone();
            return self.adopt_token(payment_mean, token, card_index.as_deref());
        }

        let card = form.validate(self.config.capabilities().check_card_number)?;
        let wallet_id = self.wallet_ids.next_wallet_id(payment_mean, customer);
        let request = self.create_wallet_request(&wallet_id, customer, card);

        debug!(wallet_id = %wallet_id, "creating wallet");
        let raw = with_deadline(
            OperationKind::CreateWallet.name(),
            options.timeout.unwrap_or_else(|| self.config.request_timeout()),
            self.client.create_wallet(request),
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "wallet creation did not reach the provider");
            GatewayError::from(e)
        })?;

        let response = classify(&raw, OperationKind::CreateWallet);
        if !response.success {
            warn!(
                provider_code = %response.provider_code,
                message = %response.message(),
                "wallet creation refused"
            );
            return Err(GatewayError::business(
                response.provider_code.clone(),
                response.message(),
            ));
        }

        payment_mean.provision_wallet(wallet_id.clone(), "")?;
        info!(wallet_id = %wallet_id, "wallet created");
        Ok(())
    }

    /// Stores a wallet token obtained outside this gateway
    pub fn adopt_token(
        &self,
        payment_mean: &mut PaymentMean,
        wallet_id: &str,
        card_index: Option<&str>,
    ) -> Result<(), GatewayError> {
        let wallet_id = wallet_id.trim();
        if wallet_id.is_empty() {
            return Err(GatewayError::validation("No Payline token given"));
        }

        let card_index = card_index.map(str::trim).unwrap_or_default();
        payment_mean.provision_wallet(wallet_id, card_index)?;
        info!(payment_mean_id = %payment_mean.id, wallet_id = %wallet_id, "wallet token adopted");
        Ok(())
    }

    /// Reads the stored wallet from the provider
    ///
    /// A refusal is returned as an unsuccessful response, not as an error.
    #[instrument(skip(self, payment_mean), fields(payment_mean_id = %payment_mean.id))]
    pub async fn fetch_wallet(
        &self,
        payment_mean: &PaymentMean,
        card_index: &str,
        version: &str,
    ) -> Result<GatewayResponse, GatewayError> {
        let wallet_id = payment_mean
            .wallet_id()
            .ok_or_else(|| GatewayError::validation("payment mean has no wallet_id"))?;

        let request = FetchWalletRequest {
            contract_number: self.config.contract_number.clone(),
            wallet_id: wallet_id.to_string(),
            card_ind: card_index.to_string(),
            version: version.to_string(),
        };

        let raw = with_deadline(
            OperationKind::FetchWallet.name(),
            self.config.request_timeout(),
            self.client.fetch_wallet(request),
        )
        .await?;

        let response = classify(&raw, OperationKind::FetchWallet);
        if !response.success {
            warn!(provider_code = %response.provider_code, "wallet lookup refused");
        }
        Ok(response)
    }

    fn create_wallet_request(
        &self,
        wallet_id: &str,
        customer: &Customer,
        card: ValidatedCard,
    ) -> CreateWalletRequest {
        let address = ProviderAddress::from_customer(customer);

        CreateWalletRequest {
            version: "0".to_string(),
            contract_number: self.config.contract_number.clone(),
            wallet: WalletHolder {
                wallet_id: wallet_id.to_string(),
                first_name: customer.first_name.clone(),
                last_name: customer.last_name.clone(),
                email: customer.email.clone(),
                comment: String::new(),
                default: String::new(),
                card_brand: "0".to_string(),
            },
            billing_address: address.clone(),
            owner_address: address.clone(),
            address,
            card: CardDetails {
                card_type: CARD_TYPE.to_string(),
                number: card.number,
                cvx: card.cvv,
                expiration_date: card.expiration,
            },
            buyer: Buyer {
                customer_id: customer.id.as_uuid().to_string(),
                ..Default::default()
            },
        }
    }
}
