//! Payment Gateway
//!
//! Orchestrates a charge against a stored wallet:
//!
//! 1. Read the wallet token from the payment mean parameters
//! 2. Build the wallet payment request (minor units, numeric currency,
//!    payment mode, buyer and order data, invoice private data)
//! 3. Call the provider under the configured deadline
//! 4. Classify the answer
//! 5. Record status, message and raw payload on the payment in one update
//!
//! A refused charge is an `Ok` outcome written to the payment. Only
//! transport, validation and configuration problems come back as errors,
//! and in those cases the payment is left as it was.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use core_kernel::{HealthCheckResult, Money, OperationMetadata};
use domain_billing::{Customer, Payment, PaymentMean, PaymentMeanParameters, PaymentStatus};

use crate::classifier::{classify, GatewayResponse, OperationKind, RecoverabilityPolicy};
use crate::client::{
    private_data, with_deadline, Buyer, ImmediateWalletPaymentRequest, OrderDetails,
    PaymentDetails, PaymentMode, ProviderClient, ACTION_AUTHORIZE_AND_CAPTURE,
    INVOICE_PRIVATE_KEY,
};
use crate::config::GatewayConfiguration;
use crate::currency::{provider_currency, CurrencyResolver, Iso4217Resolver};
use crate::error::GatewayError;
use crate::schema::{self, CardForm, FieldSchema};
use crate::wallet::{WalletIdSource, WalletManager, WalletOptions};

/// Order date layout expected by the provider
pub const ORDER_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Status message of the pending step recorded by [`PaymentGateway::recover`]
pub const RETRY_MESSAGE: &str = "retrying recoverable payment";

/// Per-call charge settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargeOptions {
    /// Card of the wallet to charge instead of the stored `card_index`
    pub card_index: Option<String>,
    /// Deadline replacing the configured request timeout
    pub timeout: Option<Duration>,
}

impl ChargeOptions {
    pub fn with_card_index(mut self, card_index: impl Into<String>) -> Self {
        self.card_index = Some(card_index.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Payline wallet payment gateway
#[derive(Clone)]
pub struct PaymentGateway {
    config: Arc<GatewayConfiguration>,
    client: Arc<dyn ProviderClient>,
    wallets: WalletManager,
    currencies: Arc<dyn CurrencyResolver>,
    policy: RecoverabilityPolicy,
}

impl PaymentGateway {
    /// Key the gateway registry routes payments with
    pub const NAME: &'static str = "payline";

    /// Creates a gateway for one merchant configuration
    pub fn new(
        config: GatewayConfiguration,
        client: Arc<dyn ProviderClient>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        let policy = config.recoverability_policy();
        let config = Arc::new(config);
        let wallets = WalletManager::new(client.clone(), config.clone());

        Ok(Self {
            config,
            client,
            wallets,
            currencies: Arc::new(Iso4217Resolver),
            policy,
        })
    }

    /// Replaces the currency resolver
    pub fn with_currency_resolver(mut self, currencies: Arc<dyn CurrencyResolver>) -> Self {
        self.currencies = currencies;
        self
    }

    /// Replaces the wallet id source
    pub fn with_wallet_ids(mut self, wallet_ids: Arc<dyn WalletIdSource>) -> Self {
        self.wallets = self.wallets.with_wallet_ids(wallet_ids);
        self
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn pretty_name(&self) -> &'static str {
        "Payline"
    }

    pub fn short_description(&self) -> &'static str {
        "Card payments through Payline wallets"
    }

    pub fn is_manual_processing(&self) -> bool {
        false
    }

    /// Statuses between pending and a final outcome; none for this gateway
    pub fn intermediate_statuses(&self) -> &'static [PaymentStatus] {
        &[]
    }

    /// Extra back office actions; none for this gateway
    pub fn possible_actions(&self) -> &'static [&'static str] {
        &[]
    }

    pub fn configuration_fields(&self) -> Vec<FieldSchema> {
        schema::configuration_fields()
    }

    pub fn parameter_fields(&self) -> Vec<FieldSchema> {
        schema::parameter_fields()
    }

    pub fn form_fields(&self) -> Vec<FieldSchema> {
        schema::form_fields()
    }

    pub fn config(&self) -> &GatewayConfiguration {
        &self.config
    }

    pub fn wallets(&self) -> &WalletManager {
        &self.wallets
    }

    /// Checks merchant settings
    pub fn validate_configuration(&self, config: &GatewayConfiguration) -> Result<(), GatewayError> {
        config.validate()
    }

    /// Checks payment mean parameters before they are saved
    pub fn validate_parameters(&self, parameters: &PaymentMeanParameters) -> Result<(), GatewayError> {
        wallet_id(parameters).map(|_| ())
    }

    /// Provider client health
    pub async fn health_check(&self) -> HealthCheckResult {
        self.client.health_check().await
    }

    /// Provisions the wallet of a newly created payment mean
    pub async fn on_create(
        &self,
        payment_mean: &mut PaymentMean,
        customer: &Customer,
        form: &CardForm,
        options: WalletOptions,
    ) -> Result<(), GatewayError> {
        if payment_mean.gateway != Self::NAME {
            return Err(GatewayError::validation(format!(
                "payment mean {} is routed to '{}'",
                payment_mean.id, payment_mean.gateway
            )));
        }
        self.wallets
            .ensure_wallet(payment_mean, customer, form, options)
            .await
    }

    /// Charges the wallet stored in `parameters`
    pub async fn charge(
        &self,
        payment: &mut Payment,
        parameters: &PaymentMeanParameters,
        customer: &Customer,
        amount: Money,
        recurrent: bool,
    ) -> Result<GatewayResponse, GatewayError> {
        self.charge_card(payment, parameters, customer, amount, recurrent, ChargeOptions::default())
            .await
    }

    /// Charges the wallet with per-call options
    ///
    /// A non-empty `options.card_index` takes precedence over the stored
    /// parameter. `options.timeout` bounds this call instead of the
    /// configured request timeout.
    #[instrument(
        skip(self, payment, parameters, customer, amount, options),
        fields(payment_id = %payment.id)
    )]
    pub async fn charge_card(
        &self,
        payment: &mut Payment,
        parameters: &PaymentMeanParameters,
        customer: &Customer,
        amount: Money,
        recurrent: bool,
        options: ChargeOptions,
    ) -> Result<GatewayResponse, GatewayError> {
        let current = payment.current_status();
        if !current.can_transition_to(PaymentStatus::Success) {
            return Err(domain_billing::BillingError::InvalidStatusTransition {
                from: current,
                to: PaymentStatus::Success,
            }
            .into());
        }

        let request = self.payment_request(
            payment,
            parameters,
            customer,
            amount,
            recurrent,
            options.card_index.as_deref(),
        )?;
        debug!(
            amount = request.payment.amount,
            currency = %request.payment.currency,
            mode = request.payment.mode.code(),
            "sending wallet payment"
        );

        let raw = with_deadline(
            OperationKind::ExecutePayment.name(),
            options.timeout.unwrap_or_else(|| self.config.request_timeout()),
            self.client.execute_payment(request),
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "wallet payment did not reach the provider");
            GatewayError::from(e)
        })?;

        let response = classify(&raw, OperationKind::ExecutePayment);
        let status = if response.success {
            PaymentStatus::Success
        } else {
            PaymentStatus::Error
        };

        payment.update_status(status, response.message(), response.audit_payload())?;

        if response.success {
            info!(provider_code = %response.provider_code, "payment accepted");
        } else {
            warn!(
                provider_code = %response.provider_code,
                message = %response.message(),
                "payment refused"
            );
        }
        Ok(response)
    }

    /// True when the payment failed with a transient cause and has not
    /// been charged since.
    ///
    /// A payment already moved back to pending for a retry stays
    /// recoverable as long as its last failure was.
    pub fn is_recoverable(&self, payment: &Payment) -> bool {
        match payment.current_status() {
            PaymentStatus::Error | PaymentStatus::Pending => {}
            PaymentStatus::Success => return false,
        }
        payment
            .last_failure()
            .and_then(|entry| GatewayResponse::from_payment_log(&entry.payload))
            .map(|response| self.policy.is_recoverable(&response))
            .unwrap_or(false)
    }

    /// Charges a recoverable payment again with its own amount
    ///
    /// A payment still in error is moved to pending before the charge, so
    /// its log reads error, pending, then the outcome. The payment is only
    /// written once the provider has answered. Nothing is retried here; the
    /// caller decides when to call this.
    #[instrument(skip(self, payment, parameters, customer), fields(payment_id = %payment.id))]
    pub async fn recover(
        &self,
        payment: &mut Payment,
        parameters: &PaymentMeanParameters,
        customer: &Customer,
    ) -> Result<GatewayResponse, GatewayError> {
        if !self.is_recoverable(payment) {
            return Err(GatewayError::validation(format!(
                "payment {} is not recoverable",
                payment.id
            )));
        }

        info!("retrying recoverable payment");
        let mut attempt = payment.clone();
        if attempt.has_error() {
            attempt.update_status(PaymentStatus::Pending, RETRY_MESSAGE, serde_json::Value::Null)?;
        }

        let amount = attempt.amount;
        let recurrent = attempt.recurrent;
        let response = self
            .charge(&mut attempt, parameters, customer, amount, recurrent)
            .await?;

        *payment = attempt;
        Ok(response)
    }

    /// Order date in the merchant timezone
    pub fn order_date(&self, at: DateTime<Utc>) -> String {
        self.config.timezone.format(at, ORDER_DATE_FORMAT)
    }

    fn payment_request(
        &self,
        payment: &Payment,
        parameters: &PaymentMeanParameters,
        customer: &Customer,
        amount: Money,
        recurrent: bool,
        card_index: Option<&str>,
    ) -> Result<ImmediateWalletPaymentRequest, GatewayError> {
        let wallet_id = wallet_id(parameters)?;

        if !amount.is_positive() {
            return Err(GatewayError::validation(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        let minor_units = amount
            .scaled_units(100)
            .map_err(|e| GatewayError::validation(e.to_string()))?;
        let currency = provider_currency(self.currencies.as_ref(), amount.currency())?;

        let metadata = OperationMetadata::with_correlation_id(payment.id.to_string())
            .with_context(INVOICE_PRIVATE_KEY, payment.invoice_id().to_string());

        let card_ind = card_index
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .or_else(|| parameters.get(PaymentMean::CARD_INDEX).map(String::as_str))
            .unwrap_or_default()
            .to_string();

        Ok(ImmediateWalletPaymentRequest {
            version: "0".to_string(),
            payment: PaymentDetails {
                amount: minor_units,
                currency: currency.clone(),
                action: ACTION_AUTHORIZE_AND_CAPTURE,
                mode: PaymentMode::from_recurrent(recurrent),
                contract_number: self.config.contract_number.clone(),
                differed_action_date: String::new(),
                soft_descriptor: String::new(),
                card_brand: "0".to_string(),
            },
            order: OrderDetails {
                reference: payment.id.to_string(),
                origin: "1".to_string(),
                amount: minor_units,
                currency,
                country: customer.country().to_string(),
                date: self.order_date(Utc::now()),
            },
            buyer: Buyer {
                legal_status: Some("2".to_string()),
                customer_id: customer.id.as_uuid().to_string(),
                first_name: Some(customer.first_name.clone()),
                last_name: Some(customer.last_name.clone()),
                email: Some(customer.email.clone()),
            },
            wallet_id: wallet_id.to_string(),
            wallet_cvx: String::new(),
            card_ind,
            private_data: private_data(&metadata),
        })
    }
}

fn wallet_id(parameters: &PaymentMeanParameters) -> Result<&str, GatewayError> {
    parameters
        .get(PaymentMean::WALLET_ID)
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .ok_or_else(|| GatewayError::validation("payment mean has no wallet_id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::mock::MockProviderClient;
    use chrono::TimeZone;
    use core_kernel::Timezone;

    fn gateway() -> PaymentGateway {
        let config = GatewayConfiguration::new("1234567", "secret", "CB-001", Environment::Test)
            .with_timezone("Europe/Paris".parse::<Timezone>().unwrap());
        PaymentGateway::new(config, Arc::new(MockProviderClient::new())).unwrap()
    }

    #[test]
    fn test_descriptor() {
        let gateway = gateway();
        assert_eq!(gateway.name(), "payline");
        assert!(!gateway.is_manual_processing());
        assert!(gateway.intermediate_statuses().is_empty());
        assert!(gateway.possible_actions().is_empty());
    }

    #[test]
    fn test_order_date_uses_merchant_timezone() {
        let at = Utc.with_ymd_and_hms(2024, 7, 15, 22, 30, 0).unwrap();
        assert_eq!(gateway().order_date(at), "16/07/2024 00:30");
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let config = GatewayConfiguration::new("", "secret", "CB-001", Environment::Test);
        let result = PaymentGateway::new(config, Arc::new(MockProviderClient::new()));
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }

    #[test]
    fn test_parameters_need_wallet() {
        let gateway = gateway();
        let mut parameters = PaymentMeanParameters::new();
        assert!(gateway.validate_parameters(&parameters).is_err());

        parameters.insert("wallet_id".to_string(), "W1".to_string());
        assert!(gateway.validate_parameters(&parameters).is_ok());
    }
}
