//! Payment means
//!
//! A payment mean is a customer's configured payment method on a given
//! gateway. Gateways keep their per-method tokens in its named parameters.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{CustomerId, PaymentMeanId};

use crate::error::BillingError;

/// Named parameters stored on a payment mean
pub type PaymentMeanParameters = BTreeMap<String, String>;

/// A customer's payment method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMean {
    /// Unique identifier
    pub id: PaymentMeanId,
    /// Owning customer
    pub customer_id: CustomerId,
    /// Gateway key this payment mean is routed to
    pub gateway: String,
    parameters: PaymentMeanParameters,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl PaymentMean {
    /// Parameter holding the provider wallet token
    pub const WALLET_ID: &'static str = "wallet_id";
    /// Parameter holding the card index inside the wallet
    pub const CARD_INDEX: &'static str = "card_index";

    /// Creates an unprovisioned payment mean
    pub fn new(customer_id: CustomerId, gateway: impl Into<String>) -> Self {
        Self {
            id: PaymentMeanId::new_v7(),
            customer_id,
            gateway: gateway.into(),
            parameters: PaymentMeanParameters::new(),
            created_at: Utc::now(),
        }
    }

    /// Returns all parameters
    pub fn parameters(&self) -> &PaymentMeanParameters {
        &self.parameters
    }

    /// Returns a single parameter
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Returns the stored wallet token, if any
    pub fn wallet_id(&self) -> Option<&str> {
        self.parameter(Self::WALLET_ID).filter(|w| !w.is_empty())
    }

    /// Returns the stored card index, if any
    pub fn card_index(&self) -> Option<&str> {
        self.parameter(Self::CARD_INDEX)
    }

    /// True once a wallet token is stored
    pub fn has_wallet(&self) -> bool {
        self.wallet_id().is_some()
    }

    /// Stores the wallet token and card index together.
    ///
    /// The wallet token is immutable once written: a new card needs a new
    /// payment mean.
    pub fn provision_wallet(
        &mut self,
        wallet_id: impl Into<String>,
        card_index: impl Into<String>,
    ) -> Result<(), BillingError> {
        if self.has_wallet() {
            return Err(BillingError::WalletAlreadyProvisioned(self.id.to_string()));
        }

        let wallet_id = wallet_id.into();
        if wallet_id.trim().is_empty() {
            return Err(BillingError::invalid_parameter(Self::WALLET_ID, "must not be empty"));
        }

        debug!(payment_mean_id = %self.id, "storing wallet parameters");
        self.parameters.insert(Self::WALLET_ID.to_string(), wallet_id);
        self.parameters.insert(Self::CARD_INDEX.to_string(), card_index.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean() -> PaymentMean {
        PaymentMean::new(CustomerId::new(), "payline")
    }

    #[test]
    fn test_new_payment_mean_has_no_wallet() {
        let mean = mean();
        assert!(!mean.has_wallet());
        assert!(mean.card_index().is_none());
    }

    #[test]
    fn test_provision_writes_both_parameters() {
        let mut mean = mean();
        mean.provision_wallet("W1", "").unwrap();

        assert_eq!(mean.wallet_id(), Some("W1"));
        assert_eq!(mean.card_index(), Some(""));
    }

    #[test]
    fn test_wallet_is_immutable() {
        let mut mean = mean();
        mean.provision_wallet("W1", "1").unwrap();

        let err = mean.provision_wallet("W2", "2").unwrap_err();
        assert!(matches!(err, BillingError::WalletAlreadyProvisioned(_)));
        assert_eq!(mean.wallet_id(), Some("W1"));
        assert_eq!(mean.card_index(), Some("1"));
    }

    #[test]
    fn test_empty_wallet_rejected_without_writing() {
        let mut mean = mean();
        assert!(mean.provision_wallet("  ", "1").is_err());
        assert!(mean.parameters().is_empty());
    }
}
