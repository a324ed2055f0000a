//! Currency Resolver
//!
//! The provider identifies currencies by their ISO 4217 numeric code,
//! always written with three digits.

use core_kernel::Currency;

use crate::error::GatewayError;

/// Maps a currency to the numeric code the provider expects
pub trait CurrencyResolver: Send + Sync {
    fn numeric_code(&self, currency: Currency) -> Option<u16>;
}

/// Resolver backed by the ISO 4217 table in `core_kernel`
#[derive(Debug, Clone, Copy, Default)]
pub struct Iso4217Resolver;

impl CurrencyResolver for Iso4217Resolver {
    fn numeric_code(&self, currency: Currency) -> Option<u16> {
        Some(currency.numeric_code())
    }
}

/// Resolves and formats the provider currency field
pub fn provider_currency(
    resolver: &dyn CurrencyResolver,
    currency: Currency,
) -> Result<String, GatewayError> {
    resolver
        .numeric_code(currency)
        .map(|code| format!("{:03}", code))
        .ok_or_else(|| GatewayError::validation(format!("unsupported currency: {}", currency)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EuroOnly;

    impl CurrencyResolver for EuroOnly {
        fn numeric_code(&self, currency: Currency) -> Option<u16> {
            (currency == Currency::EUR).then_some(978)
        }
    }

    #[test]
    fn test_numeric_codes_are_zero_padded() {
        assert_eq!(provider_currency(&Iso4217Resolver, Currency::EUR).unwrap(), "978");
        assert_eq!(provider_currency(&Iso4217Resolver, Currency::AUD).unwrap(), "036");
    }

    #[test]
    fn test_unknown_currency_is_rejected() {
        let err = provider_currency(&EuroOnly, Currency::USD).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }
}
