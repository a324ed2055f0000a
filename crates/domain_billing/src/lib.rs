//! Billing Domain - Customers, Payment Means and Payments
//!
//! This crate holds the billing-side records a payment gateway reads and
//! writes:
//!
//! - **Customer**: buyer identity and postal address sent to providers
//! - **PaymentMean**: a customer's configured payment method and the named
//!   parameters a gateway stores on it (e.g. a provider wallet token)
//! - **Payment**: one billing attempt, its status and its execution log
//!
//! # Payment status
//!
//! ```text
//! pending ──► success (terminal)
//!    │
//!    └──────► error ──► pending | success | error   (retry path)
//! ```
//!
//! Every status change goes through [`Payment::update_status`], which
//! records the status, the message and the raw gateway payload together.

pub mod customer;
pub mod payment_mean;
pub mod payment;
pub mod error;

pub use customer::{Customer, Address};
pub use payment_mean::{PaymentMean, PaymentMeanParameters};
pub use payment::{Payment, PaymentStatus, ExecutionLogEntry};
pub use error::BillingError;
