//! Unit tests for the Identifiers module

use core_kernel::{CustomerId, InvoiceId, PaymentId, PaymentMeanId};
use uuid::Uuid;

#[test]
fn test_new_generates_unique_ids() {
    assert_ne!(PaymentId::new(), PaymentId::new());
}

#[test]
fn test_new_v7_generates_time_ordered_ids() {
    let id1 = InvoiceId::new_v7();
    std::thread::sleep(std::time::Duration::from_millis(1));
    let id2 = InvoiceId::new_v7();
    let uuid1: Uuid = id1.into();
    let uuid2: Uuid = id2.into();
    assert!(uuid1 < uuid2);
}

#[test]
fn test_prefixes() {
    assert_eq!(PaymentId::prefix(), "PAY");
    assert_eq!(PaymentMeanId::prefix(), "PMM");
    assert_eq!(CustomerId::prefix(), "CUS");
    assert_eq!(InvoiceId::prefix(), "INV");
}

#[test]
fn test_parse_with_and_without_prefix() {
    let uuid = Uuid::new_v4();
    let with_prefix: CustomerId = format!("CUS-{}", uuid).parse().unwrap();
    let without_prefix: CustomerId = uuid.to_string().parse().unwrap();

    assert_eq!(with_prefix, without_prefix);
    assert_eq!(*with_prefix.as_uuid(), uuid);
}

#[test]
fn test_parse_rejects_garbage() {
    assert!("PAY-not-a-uuid".parse::<PaymentId>().is_err());
}

#[test]
fn test_serde_is_transparent() {
    let id = PaymentMeanId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", id.as_uuid()));
}
