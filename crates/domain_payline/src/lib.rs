//! Payline Domain - Tokenized wallet card payments
//!
//! This crate connects the billing records of `domain_billing` to the
//! Payline wallet web services:
//!
//! - **Wallets**: a customer's card is registered once with the provider
//!   and replaced by a wallet token stored on the payment mean
//! - **Payments**: one-shot (`CPT`) or recurrent (`REC`) charges against a
//!   stored wallet, amounts sent in minor units
//! - **Classification**: provider answer codes mapped to success/error and
//!   to retry eligibility
//!
//! # Flow
//!
//! ```text
//! caller ──► PaymentGateway ──► WalletManager ──► ProviderClient ──► Payline
//!                 │                                     │
//!                 │◄──────── RawResponse ───────────────┘
//!                 ▼
//!             classify() ──► Payment::update_status(status, message, payload)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_payline::{GatewayConfiguration, PaymentGateway};
//!
//! let gateway = PaymentGateway::new(GatewayConfiguration::from_env()?, client)?;
//! let response = gateway
//!     .charge(&mut payment, mean.parameters(), &customer, payment.amount, false)
//!     .await?;
//! if !response.success && gateway.is_recoverable(&payment) {
//!     // hand over to the retry scheduler
//! }
//! ```

pub mod classifier;
pub mod client;
pub mod config;
pub mod currency;
pub mod error;
pub mod gateway;
pub mod schema;
pub mod wallet;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use classifier::{
    classify, GatewayResponse, OperationKind, RecoverabilityPolicy, PAYMENT_SUCCESS_CODE,
    WALLET_SUCCESS_CODE,
};
pub use client::{
    CreateWalletRequest, FetchWalletRequest, ImmediateWalletPaymentRequest, PaymentMode,
    ProviderClient, ProviderCredentials, RawResponse,
};
pub use config::{Capabilities, Environment, GatewayConfiguration, GatewayVersion, WalletIdStrategy};
pub use currency::{CurrencyResolver, Iso4217Resolver};
pub use error::GatewayError;
pub use gateway::{ChargeOptions, PaymentGateway};
pub use schema::{CardForm, FieldSchema};
pub use wallet::{
    CustomerWalletId, RandomWalletId, WalletIdSource, WalletManager, WalletOptions,
    DEFAULT_INSPECTION_CARD_INDEX,
};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockProviderClient;
