//! Response Classifier
//!
//! Turns a raw provider answer into a [`GatewayResponse`] and decides
//! whether a failed payment may be retried.
//!
//! # Success codes
//!
//! | operation            | success code |
//! |----------------------|--------------|
//! | wallet create/fetch  | `02500`      |
//! | payment execution    | `00000`      |
//!
//! Every other code is a failure. Messages are carried through unchanged.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::client::RawResponse;

/// Success code of wallet operations
pub const WALLET_SUCCESS_CODE: &str = "02500";

/// Success code of payment execution
pub const PAYMENT_SUCCESS_CODE: &str = "00000";

/// Provider operation a response answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateWallet,
    FetchWallet,
    ExecutePayment,
}

impl OperationKind {
    /// Code the provider returns on success
    pub fn success_code(&self) -> &'static str {
        match self {
            OperationKind::CreateWallet | OperationKind::FetchWallet => WALLET_SUCCESS_CODE,
            OperationKind::ExecutePayment => PAYMENT_SUCCESS_CODE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::CreateWallet => "create_wallet",
            OperationKind::FetchWallet => "fetch_wallet",
            OperationKind::ExecutePayment => "execute_payment",
        }
    }
}

/// Classified provider answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayResponse {
    pub success: bool,
    pub provider_code: String,
    pub short_message: String,
    pub long_message: String,
    pub raw_payload: Value,
    pub operation: OperationKind,
}

impl GatewayResponse {
    /// Message recorded on the payment
    pub fn message(&self) -> &str {
        if self.long_message.is_empty() {
            &self.short_message
        } else {
            &self.long_message
        }
    }

    /// Rebuilds a payment answer from the payload recorded on a payment
    pub fn from_payment_log(payload: &Value) -> Option<Self> {
        let result = payload.get("result")?;
        let field = |name: &str| {
            result
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let provider_code = result.get("code")?.as_str()?.to_string();

        Some(Self {
            success: provider_code == PAYMENT_SUCCESS_CODE,
            provider_code,
            short_message: field("shortMessage"),
            long_message: field("longMessage"),
            raw_payload: payload.clone(),
            operation: OperationKind::ExecutePayment,
        })
    }

    /// Raw payload with the classification flag added
    pub fn audit_payload(&self) -> Value {
        let mut payload = self.raw_payload.clone();
        if let Value::Object(map) = &mut payload {
            map.insert("success".to_string(), Value::Bool(self.success));
        }
        payload
    }
}

/// Classifies a provider answer for the given operation
pub fn classify(raw: &RawResponse, operation: OperationKind) -> GatewayResponse {
    GatewayResponse {
        success: raw.result.code == operation.success_code(),
        provider_code: raw.result.code.clone(),
        short_message: raw.result.short_message.clone(),
        long_message: raw.result.long_message.clone(),
        raw_payload: raw.to_payload(),
        operation,
    }
}

/// Retry eligibility of failed payments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverabilityPolicy {
    codes: HashSet<String>,
    messages: HashSet<String>,
}

impl RecoverabilityPolicy {
    /// Transient payment codes
    ///
    /// `01116` amount limit exceeded, `01121` debit limit exceeded, `01202`
    /// fraud suspected by the bank, `01907` bank server error, `02101`
    /// provider server unavailable. `XXXXX` is kept from the historical
    /// list; its meaning is unknown.
    pub const DEFAULT_CODES: &'static [&'static str] =
        &["01116", "01121", "01202", "01907", "02101", "XXXXX"];

    /// Transient short messages, compared lowercase
    pub const DEFAULT_MESSAGES: &'static [&'static str] = &["could not connect to host"];

    pub fn new(
        codes: impl IntoIterator<Item = String>,
        messages: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            codes: codes.into_iter().map(|c| c.trim().to_string()).collect(),
            messages: messages.into_iter().map(|m| normalize_message(&m)).collect(),
        }
    }

    /// True when a failed payment answer may be retried later
    ///
    /// Successful answers and wallet operations are never recoverable.
    pub fn is_recoverable(&self, response: &GatewayResponse) -> bool {
        if response.success || response.operation != OperationKind::ExecutePayment {
            return false;
        }
        self.codes.contains(response.provider_code.trim())
            || self.messages.contains(&normalize_message(&response.short_message))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}

impl Default for RecoverabilityPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_CODES.iter().map(|c| c.to_string()),
            Self::DEFAULT_MESSAGES.iter().map(|m| m.to_string()),
        )
    }
}

fn normalize_message(message: &str) -> String {
    message.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment_failure(code: &str, short: &str) -> GatewayResponse {
        classify(&RawResponse::new(code, short, "Refused"), OperationKind::ExecutePayment)
    }

    #[test]
    fn test_success_codes_per_operation() {
        let wallet_ok = RawResponse::new("02500", "OK", "Operation successfull");
        assert!(classify(&wallet_ok, OperationKind::CreateWallet).success);
        assert!(classify(&wallet_ok, OperationKind::FetchWallet).success);
        assert!(!classify(&wallet_ok, OperationKind::ExecutePayment).success);

        let payment_ok = RawResponse::new("00000", "ACCEPTED", "Transaction approved");
        assert!(classify(&payment_ok, OperationKind::ExecutePayment).success);
        assert!(!classify(&payment_ok, OperationKind::CreateWallet).success);
    }

    #[test]
    fn test_messages_carried_verbatim() {
        let response = payment_failure("01116", "REFUSED");
        assert_eq!(response.provider_code, "01116");
        assert_eq!(response.short_message, "REFUSED");
        assert_eq!(response.message(), "Refused");
        assert_eq!(response.raw_payload["result"]["code"], "01116");
    }

    #[test]
    fn test_default_recoverable_codes() {
        let policy = RecoverabilityPolicy::default();
        assert!(policy.is_recoverable(&payment_failure("01907", "ERROR")));
        assert!(policy.is_recoverable(&payment_failure("01116", "REFUSED")));
        assert!(!policy.is_recoverable(&payment_failure("99999", "ERROR")));
    }

    #[test]
    fn test_transient_message_is_case_insensitive() {
        let policy = RecoverabilityPolicy::default();
        assert!(policy.is_recoverable(&payment_failure("99999", "Could Not Connect To Host")));
        assert!(policy.is_recoverable(&payment_failure("99999", " could not connect to host ")));
        assert!(!policy.is_recoverable(&payment_failure("99999", "could not connect")));
    }

    #[test]
    fn test_success_and_wallet_failures_not_recoverable() {
        let policy = RecoverabilityPolicy::default();
        let ok = classify(&RawResponse::new("00000", "", ""), OperationKind::ExecutePayment);
        assert!(!policy.is_recoverable(&ok));

        let wallet = classify(&RawResponse::new("01907", "", ""), OperationKind::CreateWallet);
        assert!(!policy.is_recoverable(&wallet));
    }

    #[test]
    fn test_audit_payload_flags_outcome() {
        let response = payment_failure("01116", "REFUSED");
        assert_eq!(response.audit_payload()["success"], false);
    }

    #[test]
    fn test_rebuild_from_payment_log() {
        let logged = payment_failure("01907", "ERROR").audit_payload();
        let rebuilt = GatewayResponse::from_payment_log(&logged).unwrap();

        assert!(!rebuilt.success);
        assert_eq!(rebuilt.provider_code, "01907");
        assert_eq!(rebuilt.short_message, "ERROR");
        assert_eq!(rebuilt.operation, OperationKind::ExecutePayment);

        assert!(GatewayResponse::from_payment_log(&serde_json::json!({"note": "manual"})).is_none());
    }
}
