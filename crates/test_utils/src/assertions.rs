//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use domain_billing::{Payment, PaymentMean, PaymentStatus};
use domain_payline::GatewayError;

/// Asserts the payment status and that the last log entry matches it
pub fn assert_payment_status(payment: &Payment, expected: PaymentStatus) {
    assert_eq!(
        payment.current_status(),
        expected,
        "Expected payment {} to be {:?}, log: {:?}",
        payment.id,
        expected,
        payment.execution_log()
    );
    let last = payment
        .last_execution()
        .expect("a status change leaves a log entry");
    assert_eq!(last.status, expected, "Last log entry disagrees with status");
}

/// Asserts that a payment has never been touched by a gateway
pub fn assert_payment_untouched(payment: &Payment) {
    assert_eq!(payment.current_status(), PaymentStatus::Pending);
    assert!(
        payment.execution_log().is_empty(),
        "Expected no log entries, got {:?}",
        payment.execution_log()
    );
    assert!(payment.status_message().is_none());
}

/// Asserts the statuses recorded in a payment's execution log, oldest first
pub fn assert_log_statuses(payment: &Payment, expected: &[PaymentStatus]) {
    let statuses: Vec<PaymentStatus> = payment
        .execution_log()
        .iter()
        .map(|entry| entry.status)
        .collect();
    assert_eq!(statuses, expected, "execution log mismatch");
}

/// Asserts the wallet parameters of a payment mean
pub fn assert_wallet(mean: &PaymentMean, wallet_id: &str, card_index: &str) {
    assert_eq!(mean.wallet_id(), Some(wallet_id), "wallet_id mismatch");
    assert_eq!(mean.card_index(), Some(card_index), "card_index mismatch");
}

/// Asserts that a payment mean has neither wallet parameter
pub fn assert_no_wallet(mean: &PaymentMean) {
    assert!(
        mean.parameters().is_empty(),
        "Expected no wallet parameters, got {:?}",
        mean.parameters()
    );
}

/// Asserts that an error is a provider refusal with the given code
pub fn assert_business_error(error: &GatewayError, code: &str) {
    assert_eq!(
        error.provider_code(),
        Some(code),
        "Expected business error {}, got {:?}",
        code,
        error
    );
}
