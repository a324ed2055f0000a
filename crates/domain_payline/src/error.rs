//! Gateway errors
//!
//! Only problems that stop a request from reaching the provider, or stop a
//! provider answer from being recorded, are errors. A refused charge is a
//! normal outcome and is written to the payment instead.

use thiserror::Error;

use core_kernel::PortError;
use domain_billing::BillingError;

/// Errors raised by the Payline gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network, timeout or decoding failure talking to the provider
    #[error("Transport error: {0}")]
    Transport(#[from] PortError),

    /// The provider answered with a non-success code
    #[error("Gateway error {provider_code}: {message}")]
    Business {
        provider_code: String,
        message: String,
    },

    /// Input rejected before any provider call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Merchant configuration missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Billing record refused the change
    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        GatewayError::Configuration(message.into())
    }

    pub fn business(provider_code: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Business {
            provider_code: provider_code.into(),
            message: message.into(),
        }
    }

    /// True for transport failures the caller may retry right away
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }

    /// Provider code carried by a business failure
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            GatewayError::Business { provider_code, .. } => Some(provider_code),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for GatewayError {
    fn from(err: config::ConfigError) -> Self {
        GatewayError::Configuration(err.to_string())
    }
}
