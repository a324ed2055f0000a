//! Tests for domain_billing

use core_kernel::{Currency, CustomerId, InvoiceId, Money, PaymentMeanId};
use rust_decimal_macros::dec;
use serde_json::json;

use domain_billing::{Address, BillingError, Customer, Payment, PaymentMean, PaymentStatus};

// ============================================================================
// Customer Tests
// ============================================================================

mod customer_tests {
    use super::*;

    #[test]
    fn test_customer_with_address() {
        let customer = Customer::new("Acme", "Ada", "Lovelace", "ada@acme.test").with_address(
            Address {
                line1: "1 rue de la Paix".to_string(),
                zip_code: "75002".to_string(),
                city: "Paris".to_string(),
                country: "FR".to_string(),
                ..Default::default()
            },
        );

        assert_eq!(customer.country(), "FR");
        assert_eq!(customer.address.city, "Paris");
    }
}

// ============================================================================
// Payment Mean Tests
// ============================================================================

mod payment_mean_tests {
    use super::*;

    #[test]
    fn test_parameters_are_serialized() {
        let mut mean = PaymentMean::new(CustomerId::new(), "payline");
        mean.provision_wallet("W1", "2").unwrap();

        let json = serde_json::to_value(&mean).unwrap();
        assert_eq!(json["parameters"]["wallet_id"], "W1");
        assert_eq!(json["parameters"]["card_index"], "2");

        let back: PaymentMean = serde_json::from_value(json).unwrap();
        assert_eq!(back.wallet_id(), Some("W1"));
    }

    #[test]
    fn test_second_provisioning_is_rejected() {
        let mut mean = PaymentMean::new(CustomerId::new(), "payline");
        mean.provision_wallet("W1", "").unwrap();

        assert_eq!(
            mean.provision_wallet("W1", ""),
            Err(BillingError::WalletAlreadyProvisioned(mean.id.to_string()))
        );
    }
}

// ============================================================================
// Payment Tests
// ============================================================================

mod payment_tests {
    use super::*;

    fn create_test_payment() -> Payment {
        Payment::new(
            InvoiceId::new(),
            PaymentMeanId::new(),
            Money::new(dec!(19.99), Currency::EUR),
            true,
        )
    }

    #[test]
    fn test_payment_record_accessors() {
        let payment = create_test_payment();

        assert_eq!(payment.amount(), dec!(19.99));
        assert_eq!(payment.currency(), Currency::EUR);
        assert_eq!(payment.invoice_id(), payment.invoice_id);
        assert!(payment.recurrent);
    }

    #[test]
    fn test_rejected_transition_leaves_payment_untouched() {
        let mut payment = create_test_payment();
        payment
            .update_status(PaymentStatus::Success, "Transaction approved", json!({"ok": true}))
            .unwrap();
        let before = payment.updated_at;

        let result = payment.update_status(PaymentStatus::Error, "late failure", json!({}));

        assert!(result.is_err());
        assert_eq!(payment.current_status(), PaymentStatus::Success);
        assert_eq!(payment.status_message(), Some("Transaction approved"));
        assert_eq!(payment.updated_at, before);
        assert_eq!(payment.execution_log().len(), 1);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&PaymentStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&PaymentStatus::Success).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&PaymentStatus::Error).unwrap(), "\"error\"");
    }
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn status() -> impl Strategy<Value = PaymentStatus> {
        prop_oneof![
            Just(PaymentStatus::Pending),
            Just(PaymentStatus::Success),
            Just(PaymentStatus::Error),
        ]
    }

    proptest! {
        #[test]
        fn log_length_matches_accepted_updates(updates in proptest::collection::vec(status(), 0..20)) {
            let mut payment = Payment::new(
                InvoiceId::new(),
                PaymentMeanId::new(),
                Money::new(dec!(5), Currency::EUR),
                false,
            );

            let mut accepted = 0;
            for next in updates {
                if payment.update_status(next, "step", json!({})).is_ok() {
                    accepted += 1;
                }
            }

            prop_assert_eq!(payment.execution_log().len(), accepted);
            if let Some(last) = payment.last_execution() {
                prop_assert_eq!(last.status, payment.current_status());
            }
        }

        #[test]
        fn nothing_leaves_success(next in status()) {
            prop_assert!(!PaymentStatus::Success.can_transition_to(next));
        }
    }
}
