//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for customers, merchant configuration,
//! card forms and provider answers. Fixtures are deterministic unless their
//! name says otherwise.

use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal_macros::dec;
use serde_json::json;

use core_kernel::{Currency, Money, Timezone};
use domain_billing::{Address, Customer};
use domain_payline::{CardForm, Environment, GatewayConfiguration, GatewayVersion, RawResponse};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// 10.00 EUR
    pub fn eur_10() -> Money {
        Money::new(dec!(10.00), Currency::EUR)
    }

    /// 19.99 EUR
    pub fn eur_19_99() -> Money {
        Money::new(dec!(19.99), Currency::EUR)
    }

    /// 49.50 USD
    pub fn usd_49_50() -> Money {
        Money::new(dec!(49.50), Currency::USD)
    }

    /// Zero EUR, refused by the gateway
    pub fn eur_zero() -> Money {
        Money::new(dec!(0), Currency::EUR)
    }
}

/// Fixture for customers
pub struct CustomerFixtures;

impl CustomerFixtures {
    /// French company with a three line address
    pub fn acme() -> Customer {
        Customer::new("Acme SAS", "Ada", "Lovelace", "ada@acme.test").with_address(Address {
            line1: " 12 rue de la Paix ".to_string(),
            line2: "Bâtiment B".to_string(),
            line3: "3e étage".to_string(),
            zip_code: "75002".to_string(),
            city: "Paris".to_string(),
            country: "FR".to_string(),
        })
    }

    /// Customer with generated names and email
    pub fn random() -> Customer {
        let business: String = CompanyName().fake();
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let email: String = SafeEmail().fake();

        Customer::new(business, first, last, email).with_address(Address {
            line1: "1 Main Street".to_string(),
            zip_code: "10001".to_string(),
            city: "New York".to_string(),
            country: "US".to_string(),
            ..Default::default()
        })
    }
}

/// Fixture for merchant configuration
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Homologation account, current generation, UTC
    pub fn homologation() -> GatewayConfiguration {
        GatewayConfiguration::new("1234567", "test-api-key", "CB-001", Environment::Test)
    }

    /// Homologation account on the first generation
    pub fn legacy() -> GatewayConfiguration {
        Self::homologation().with_version(GatewayVersion::V1)
    }

    /// Production account formatting dates in Paris time
    pub fn paris_production() -> GatewayConfiguration {
        GatewayConfiguration::new("7654321", "prod-api-key", "CB-900", Environment::Production)
            .with_timezone(Timezone::new(chrono_tz::Europe::Paris))
    }
}

/// Fixture for card forms
pub struct CardFixtures;

impl CardFixtures {
    /// Well formed card, expiration with a slash
    pub fn valid() -> CardForm {
        CardForm::new("4929 5508 6198 1029", "123", "12/25")
    }

    /// Card with a bad verification code
    pub fn bad_cvv() -> CardForm {
        CardForm::new("4929550861981029", "12", "1225")
    }

    /// Card with an impossible month
    pub fn bad_expiration() -> CardForm {
        CardForm::new("4929550861981029", "123", "13/25")
    }
}

/// Fixture for provider answers
pub struct ResponseFixtures;

impl ResponseFixtures {
    pub fn wallet_created() -> RawResponse {
        RawResponse::new("02500", "OK", "Operation Successfull")
    }

    pub fn wallet_refused() -> RawResponse {
        RawResponse::new("02305", "ERROR", "Invalid field format : Card Number")
    }

    pub fn payment_accepted() -> RawResponse {
        RawResponse::new("00000", "ACCEPTED", "Transaction approved").with_field(
            "transaction",
            json!({"id": "26166143441054", "date": "15/07/2024 10:00", "isDuplicated": "0"}),
        )
    }

    /// Refusal with the given code
    pub fn payment_refused(code: &str) -> RawResponse {
        RawResponse::new(code, "REFUSED", "Transaction refused")
    }

    /// Refusal carrying the connectivity short message
    pub fn payment_unreachable_bank() -> RawResponse {
        RawResponse::new("99999", "Could Not Connect To Host", "Internal error")
    }
}
