//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating provider codes, messages
//! and payment amounts.

use core_kernel::{Currency, Money};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating supported currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    proptest::sample::select(Currency::ALL.to_vec())
}

/// Strategy for five digit provider codes
pub fn provider_code_strategy() -> impl Strategy<Value = String> {
    "[0-9]{5}"
}

/// Strategy for provider codes other than `excluded`
pub fn provider_code_except(excluded: &'static str) -> impl Strategy<Value = String> {
    provider_code_strategy().prop_filter("excluded code", move |c| c != excluded)
}

/// Strategy for random casing of a phrase
pub fn random_case(phrase: &'static str) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), phrase.len()).prop_map(move |upper| {
        phrase
            .chars()
            .zip(upper)
            .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

/// Strategy for positive amounts with two decimals
pub fn positive_cents_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000i64
}

/// Strategy for positive Money values with two decimals
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_cents_strategy(), currency_strategy())
        .prop_map(|(cents, currency)| Money::new(Decimal::new(cents, 2), currency))
}

/// Strategy for valid `MMYY` expiration dates
pub fn expiration_strategy() -> impl Strategy<Value = (u8, u8)> {
    (1u8..=12, 0u8..=99)
}
