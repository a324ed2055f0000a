//! Billing domain errors

use thiserror::Error;

use crate::payment::PaymentStatus;

/// Errors that can occur in the billing domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    /// Payment status change not allowed by the status state machine
    #[error("Invalid payment status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// A wallet token is already stored on the payment mean
    #[error("Payment mean {0} already has a wallet")]
    WalletAlreadyProvisioned(String),

    /// A parameter value was rejected
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },
}

impl BillingError {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        BillingError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
