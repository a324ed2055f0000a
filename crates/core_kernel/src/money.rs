//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors,
//! together with the ISO 4217 data payment providers ask for.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::CoreError;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CHF,
    INR,
    AUD,
    CAD,
    SGD,
    HKD,
}

impl Currency {
    /// All supported currencies
    pub const ALL: [Currency; 10] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CHF,
        Currency::INR,
        Currency::AUD,
        Currency::CAD,
        Currency::SGD,
        Currency::HKD,
    ];

    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CHF => "CHF",
            Currency::INR => "₹",
            Currency::AUD => "A$",
            Currency::CAD => "C$",
            Currency::SGD => "S$",
            Currency::HKD => "HK$",
        }
    }

    /// Returns the ISO 4217 alphabetic code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::INR => "INR",
            Currency::AUD => "AUD",
            Currency::CAD => "CAD",
            Currency::SGD => "SGD",
            Currency::HKD => "HKD",
        }
    }

    /// Returns the ISO 4217 numeric code
    pub fn numeric_code(&self) -> u16 {
        match self {
            Currency::USD => 840,
            Currency::EUR => 978,
            Currency::GBP => 826,
            Currency::JPY => 392,
            Currency::CHF => 756,
            Currency::INR => 356,
            Currency::AUD => 36,
            Currency::CAD => 124,
            Currency::SGD => 702,
            Currency::HKD => 344,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| CoreError::validation(format!("Unknown currency code: {}", s)))
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount with associated currency
///
/// Amounts are stored with 4 decimal places internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns the amount multiplied by `scale` as an integer, rounding
    /// half to even.
    ///
    /// Providers that take integer amounts ask for `scale = 100` regardless
    /// of the currency's own exponent.
    pub fn scaled_units(&self, scale: u32) -> Result<i64, MoneyError> {
        let scaled = self
            .amount
            .checked_mul(Decimal::from(scale))
            .ok_or(MoneyError::Overflow)?;
        scaled.round().to_i64().ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = dp as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50), Currency::USD);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::USD);
    }

    #[test]
    fn test_scaled_units_by_hundred() {
        let m = Money::new(dec!(19.99), Currency::EUR);
        assert_eq!(m.scaled_units(100).unwrap(), 1999);
    }

    #[test]
    fn test_numeric_codes() {
        assert_eq!(Currency::EUR.numeric_code(), 978);
        assert_eq!(Currency::USD.numeric_code(), 840);
        assert_eq!(Currency::AUD.numeric_code(), 36);
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("eur".parse::<Currency>().unwrap(), Currency::EUR);
        assert!("XYZ".parse::<Currency>().is_err());
    }

    #[test]
    fn test_positive_excludes_zero_and_negative() {
        assert!(Money::new(dec!(0.01), Currency::EUR).is_positive());
        assert!(!Money::new(dec!(0), Currency::EUR).is_positive());
        assert!(!Money::new(dec!(-5), Currency::EUR).is_positive());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn scaled_units_recovers_cents(cents in 0i64..1_000_000_000i64) {
            let money = Money::new(Decimal::new(cents, 2), Currency::EUR);
            prop_assert_eq!(money.scaled_units(100).unwrap(), cents);
        }

        #[test]
        fn currency_code_round_trips(idx in 0usize..Currency::ALL.len()) {
            let currency = Currency::ALL[idx];
            prop_assert_eq!(currency.code().parse::<Currency>().unwrap(), currency);
        }
    }
}
