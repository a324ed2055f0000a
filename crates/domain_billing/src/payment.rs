//! Payment processing
//!
//! This module handles payment status tracking. A payment's status, its
//! status message and the raw gateway payload are only ever changed together,
//! through [`Payment::update_status`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{Currency, InvoiceId, Money, PaymentId, PaymentMeanId};

use crate::error::BillingError;

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment is waiting for (or being retried through) the gateway
    Pending,
    /// Payment completed successfully
    Success,
    /// Payment failed
    Error,
}

impl PaymentStatus {
    /// Returns true if `next` may follow this status
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        match (self, next) {
            (PaymentStatus::Success, _) => false,
            (PaymentStatus::Pending, _) | (PaymentStatus::Error, _) => true,
        }
    }

    /// Returns true if no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Success)
    }
}

/// One recorded status change with the gateway payload that caused it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub status: PaymentStatus,
    pub message: String,
    pub payload: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// A payment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Invoice being paid
    pub invoice_id: InvoiceId,
    /// Payment mean to charge
    pub payment_mean_id: PaymentMeanId,
    /// Payment amount
    pub amount: Money,
    /// Whether the charge belongs to a recurring billing relationship
    pub recurrent: bool,
    status: PaymentStatus,
    status_message: Option<String>,
    execution_log: Vec<ExecutionLogEntry>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new pending payment
    ///
    /// # Arguments
    ///
    /// * `invoice_id` - Invoice being paid
    /// * `payment_mean_id` - Payment mean to charge
    /// * `amount` - Payment amount
    /// * `recurrent` - Recurring billing flag
    pub fn new(
        invoice_id: InvoiceId,
        payment_mean_id: PaymentMeanId,
        amount: Money,
        recurrent: bool,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: PaymentId::new_v7(),
            invoice_id,
            payment_mean_id,
            amount,
            recurrent,
            status: PaymentStatus::Pending,
            status_message: None,
            execution_log: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount without currency
    pub fn amount(&self) -> Decimal {
        self.amount.amount()
    }

    /// Payment currency
    pub fn currency(&self) -> Currency {
        self.amount.currency()
    }

    /// Invoice this payment settles
    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    /// Current status
    pub fn current_status(&self) -> PaymentStatus {
        self.status
    }

    /// Message recorded with the current status
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// True when the current status is an error
    pub fn has_error(&self) -> bool {
        self.status == PaymentStatus::Error
    }

    /// Full status history, oldest first
    pub fn execution_log(&self) -> &[ExecutionLogEntry] {
        &self.execution_log
    }

    /// Most recent log entry
    pub fn last_execution(&self) -> Option<&ExecutionLogEntry> {
        self.execution_log.last()
    }

    /// Most recent failed attempt
    pub fn last_failure(&self) -> Option<&ExecutionLogEntry> {
        self.execution_log
            .iter()
            .rev()
            .find(|entry| entry.status == PaymentStatus::Error)
    }

    /// Records a status change with its message and raw gateway payload.
    ///
    /// The transition is checked before anything is written; on error the
    /// payment is left exactly as it was.
    pub fn update_status(
        &mut self,
        status: PaymentStatus,
        message: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<(), BillingError> {
        if !self.status.can_transition_to(status) {
            return Err(BillingError::InvalidStatusTransition {
                from: self.status,
                to: status,
            });
        }

        let message = message.into();
        let now = Utc::now();
        let entry = ExecutionLogEntry {
            status,
            message: message.clone(),
            payload,
            recorded_at: now,
        };

        self.execution_log.push(entry);
        self.status = status;
        self.status_message = Some(message);
        self.updated_at = now;

        info!(payment_id = %self.id, status = ?status, "payment status updated");
        Ok(())
    }
}
