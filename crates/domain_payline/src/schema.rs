//! Field declarations and card form validation
//!
//! The billing platform renders merchant settings, payment mean parameters
//! and the card entry form from the declarations below. Card data entered
//! in the form is only forwarded to the provider to create a wallet; it is
//! never stored.
//!
//! # Validation Rules
//!
//! - Card number: digits only once spaces are removed, 12 to 19 digits
//! - Verification code (CVV): exactly 3 digits
//! - Expiration date: `MMYY` or `MM/YY`, month between 01 and 12,
//!   normalized to `MMYY`

use std::fmt;

use serde::Serialize;

use crate::config::Environment;
use crate::error::GatewayError;

/// Kind of input a field expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Select { options: Vec<SelectOption> },
}

/// One choice of a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Format constraint checked by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    CardNumber,
    Cvv,
    Expiration,
}

/// Declaration of a named field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FieldFormat>,
}

impl FieldSchema {
    fn text(name: &'static str, label: &'static str, required: bool) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required,
            default: None,
            placeholder: None,
            help: None,
            format: None,
        }
    }

    fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    fn with_format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Merchant configuration fields
pub fn configuration_fields() -> Vec<FieldSchema> {
    let environments = [Environment::Test, Environment::Production, Environment::ProductionCert]
        .iter()
        .map(|env| SelectOption {
            value: env.key(),
            label: env.label(),
        })
        .collect();

    vec![
        FieldSchema::text("merchant_id", "Merchant ID", true),
        FieldSchema::text("api_key", "API key", true),
        FieldSchema::text("contract_number", "Contract number", true),
        FieldSchema {
            kind: FieldKind::Select {
                options: environments,
            },
            ..FieldSchema::text("environment", "Environment", true)
        },
    ]
}

/// Fields stored on each payment mean
pub fn parameter_fields() -> Vec<FieldSchema> {
    vec![
        FieldSchema::text("wallet_id", "Wallet ID", true),
        FieldSchema {
            default: Some(""),
            help: Some("Define the card index to use, default card will be used if blank."),
            ..FieldSchema::text("card_index", "Card index", false)
        },
    ]
}

/// Card entry form fields
pub fn form_fields() -> Vec<FieldSchema> {
    vec![
        FieldSchema::text("card_number", "Card number", true)
            .with_placeholder("ex: 4929550861981029")
            .with_format(FieldFormat::CardNumber),
        FieldSchema::text("card_cvv", "Verification code", true).with_format(FieldFormat::Cvv),
        FieldSchema::text("card_exp", "Expiration date", true)
            .with_placeholder("format: MMYY")
            .with_format(FieldFormat::Expiration),
    ]
}

/// Result of form validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts into a single validation error
    pub fn into_result(self) -> Result<(), GatewayError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(GatewayError::Validation(self.errors.join("; ")))
        }
    }
}

/// Checks a verification code: exactly 3 ASCII digits
pub fn validate_cvv(cvv: &str) -> Result<(), GatewayError> {
    if cvv.len() == 3 && cvv.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(GatewayError::validation("card_cvv must be exactly 3 digits"))
    }
}

/// Normalizes an expiration date given as `MM/YY` or `MMYY` to `MMYY`
pub fn normalize_expiration(exp: &str) -> Result<String, GatewayError> {
    let exp = exp.trim();
    let digits = match exp.len() {
        5 if exp.as_bytes()[2] == b'/' => format!("{}{}", &exp[..2], &exp[3..]),
        4 => exp.to_string(),
        _ => return Err(GatewayError::validation("card_exp must be MMYY or MM/YY")),
    };

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GatewayError::validation("card_exp must be MMYY or MM/YY"));
    }

    match digits[..2].parse::<u8>() {
        Ok(month) if (1..=12).contains(&month) => Ok(digits),
        _ => Err(GatewayError::validation("card_exp month must be between 01 and 12")),
    }
}

/// Strips spaces from a card number and checks its digits
pub fn normalize_card_number(number: &str) -> Result<String, GatewayError> {
    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    if (12..=19).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) {
        Ok(digits)
    } else {
        Err(GatewayError::validation("card_number must contain 12 to 19 digits"))
    }
}

/// Card data entered in the payment mean form
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardForm {
    pub card_number: String,
    pub card_cvv: String,
    pub card_exp: String,
}

impl fmt::Debug for CardForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardForm")
            .field("card_number", &"***")
            .field("card_cvv", &"***")
            .field("card_exp", &self.card_exp)
            .finish()
    }
}

/// Card data ready to be sent to the provider
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedCard {
    pub number: String,
    pub cvv: String,
    /// `MMYY`
    pub expiration: String,
}

impl fmt::Debug for ValidatedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedCard")
            .field("number", &"***")
            .field("cvv", &"***")
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl CardForm {
    pub fn new(
        card_number: impl Into<String>,
        card_cvv: impl Into<String>,
        card_exp: impl Into<String>,
    ) -> Self {
        Self {
            card_number: card_number.into(),
            card_cvv: card_cvv.into(),
            card_exp: card_exp.into(),
        }
    }

    /// Validates the form.
    ///
    /// The expiration date is always normalized and the verification code
    /// always checked. With `strict`, the card number digits are checked too.
    pub fn validate(&self, strict: bool) -> Result<ValidatedCard, GatewayError> {
        let mut result = ValidationResult::default();

        let expiration = normalize_expiration(&self.card_exp)
            .map_err(|e| result.add_error(e.to_string()))
            .ok();

        let number = if strict {
            normalize_card_number(&self.card_number)
                .map_err(|e| result.add_error(e.to_string()))
                .ok()
        } else {
            Some(self.card_number.trim().to_string())
        };

        if let Err(e) = validate_cvv(&self.card_cvv) {
            result.add_error(e.to_string());
        }

        result.into_result()?;

        match (number, expiration) {
            (Some(number), Some(expiration)) => Ok(ValidatedCard {
                number,
                cvv: self.card_cvv.clone(),
                expiration,
            }),
            _ => Err(GatewayError::validation("invalid card form")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiration_formats() {
        assert_eq!(normalize_expiration("12/25").unwrap(), "1225");
        assert_eq!(normalize_expiration("1225").unwrap(), "1225");
        assert_eq!(normalize_expiration(" 01/30 ").unwrap(), "0130");
    }

    #[test]
    fn test_expiration_rejects_bad_input() {
        for bad in ["", "1/25", "12-25", "122", "12255", "ab/cd", "13/25", "00/25", "12/2a"] {
            assert!(normalize_expiration(bad).is_err(), "{:?} should fail", bad);
        }
    }

    #[test]
    fn test_cvv() {
        assert!(validate_cvv("123").is_ok());
        for bad in ["12", "1234", "abc", "", "12a"] {
            assert!(validate_cvv(bad).is_err(), "{:?} should fail", bad);
        }
    }

    #[test]
    fn test_card_number() {
        assert_eq!(
            normalize_card_number("4929 5508 6198 1029").unwrap(),
            "4929550861981029"
        );
        assert!(normalize_card_number("4929-5508").is_err());
    }

    #[test]
    fn test_strict_form_collects_all_errors() {
        let form = CardForm::new("12", "1", "99/99");
        match form.validate(true) {
            Err(GatewayError::Validation(msg)) => {
                assert!(msg.contains("card_number"));
                assert!(msg.contains("card_cvv"));
                assert!(msg.contains("card_exp"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_form_skips_card_number() {
        let card = CardForm::new("4111", "123", "12/25").validate(false).unwrap();
        assert_eq!(card.expiration, "1225");
        assert_eq!(card.number, "4111");
    }

    #[test]
    fn test_lenient_form_still_checks_cvv() {
        match CardForm::new("4111", "12", "12/25").validate(false) {
            Err(GatewayError::Validation(msg)) => {
                assert!(msg.contains("card_cvv"));
                assert!(!msg.contains("card_number"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_card_data() {
        let form = CardForm::new("4929550861981029", "123", "1225");
        let debug = format!("{:?}", form);
        assert!(!debug.contains("4929550861981029"));
        assert!(!debug.contains("123\""));
    }

    #[test]
    fn test_declarations() {
        let names: Vec<_> = configuration_fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["merchant_id", "api_key", "contract_number", "environment"]);

        let card_index = parameter_fields().into_iter().find(|f| f.name == "card_index").unwrap();
        assert!(!card_index.required);
        assert_eq!(card_index.default, Some(""));

        let formats: Vec<_> = form_fields().iter().filter_map(|f| f.format).collect();
        assert_eq!(formats, [FieldFormat::CardNumber, FieldFormat::Cvv, FieldFormat::Expiration]);
    }
}
