//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use std::sync::Arc;

use core_kernel::{InvoiceId, Money, PaymentMeanId};
use domain_billing::{Customer, Payment, PaymentMean};
use domain_payline::{GatewayConfiguration, MockProviderClient, PaymentGateway};

use crate::fixtures::{ConfigFixtures, CustomerFixtures, MoneyFixtures};

/// Builder for payment means
pub struct TestPaymentMeanBuilder {
    customer: Customer,
    gateway: String,
    wallet: Option<(String, String)>,
}

impl Default for TestPaymentMeanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPaymentMeanBuilder {
    /// Creates an unprovisioned Payline payment mean for the Acme customer
    pub fn new() -> Self {
        Self {
            customer: CustomerFixtures::acme(),
            gateway: PaymentGateway::NAME.to_string(),
            wallet: None,
        }
    }

    /// Sets the owning customer
    pub fn for_customer(mut self, customer: Customer) -> Self {
        self.customer = customer;
        self
    }

    /// Routes the payment mean to another gateway
    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into();
        self
    }

    /// Stores a wallet token
    pub fn with_wallet(mut self, wallet_id: impl Into<String>, card_index: impl Into<String>) -> Self {
        self.wallet = Some((wallet_id.into(), card_index.into()));
        self
    }

    /// Builds the payment mean along with its customer
    pub fn build(self) -> (PaymentMean, Customer) {
        let mut mean = PaymentMean::new(self.customer.id, self.gateway);
        if let Some((wallet_id, card_index)) = self.wallet {
            mean.provision_wallet(wallet_id, card_index)
                .expect("fresh payment mean accepts a wallet");
        }
        (mean, self.customer)
    }
}

/// Builder for payments
pub struct TestPaymentBuilder {
    invoice_id: InvoiceId,
    payment_mean_id: PaymentMeanId,
    amount: Money,
    recurrent: bool,
}

impl Default for TestPaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPaymentBuilder {
    /// Creates a pending one-shot payment of 10.00 EUR
    pub fn new() -> Self {
        Self {
            invoice_id: InvoiceId::new(),
            payment_mean_id: PaymentMeanId::new(),
            amount: MoneyFixtures::eur_10(),
            recurrent: false,
        }
    }

    pub fn with_invoice_id(mut self, invoice_id: InvoiceId) -> Self {
        self.invoice_id = invoice_id;
        self
    }

    /// Links the payment to a payment mean
    pub fn for_payment_mean(mut self, mean: &PaymentMean) -> Self {
        self.payment_mean_id = mean.id;
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn recurrent(mut self, recurrent: bool) -> Self {
        self.recurrent = recurrent;
        self
    }

    pub fn build(self) -> Payment {
        Payment::new(self.invoice_id, self.payment_mean_id, self.amount, self.recurrent)
    }
}

/// Gateway wired to a mock provider client
///
/// The returned mock shares its state with the one inside the gateway.
pub struct TestGatewayBuilder {
    config: GatewayConfiguration,
    client: MockProviderClient,
}

impl Default for TestGatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestGatewayBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigFixtures::homologation(),
            client: MockProviderClient::new(),
        }
    }

    pub fn with_config(mut self, config: GatewayConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn with_client(mut self, client: MockProviderClient) -> Self {
        self.client = client;
        self
    }

    pub fn build(self) -> (PaymentGateway, MockProviderClient) {
        let gateway = PaymentGateway::new(self.config, Arc::new(self.client.clone()))
            .expect("test configuration is valid");
        (gateway, self.client)
    }
}
