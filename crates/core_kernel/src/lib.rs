//! Core Kernel - Foundational types shared by the billing and gateway crates
//!
//! This crate provides the fundamental building blocks used across the workspace:
//! - Money types with precise decimal arithmetic and ISO 4217 currency data
//! - Timezone handling for locale-sensitive formatting
//! - Strongly-typed identifiers
//! - Port abstractions and the transport error taxonomy for external adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use temporal::Timezone;
pub use identifiers::{PaymentId, PaymentMeanId, CustomerId, InvoiceId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
pub use error::CoreError;
