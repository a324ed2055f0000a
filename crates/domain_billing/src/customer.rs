//! Customer records
//!
//! The billing platform owns customers; gateways only read the buyer
//! identity and the organisation address from them.

use serde::{Deserialize, Serialize};

use core_kernel::CustomerId;

/// Organisation postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub zip_code: String,
    pub city: String,
    /// Country (ISO 3166-1 alpha-2)
    pub country: String,
}

impl Address {
    /// Second street line as providers expect it: lines 2 and 3 joined by a
    /// newline, surrounding whitespace removed
    pub fn street2(&self) -> String {
        format!("{}\n{}", self.line2, self.line3).trim().to_string()
    }
}

/// A billed customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: CustomerId,
    /// Organisation / business name
    pub business_name: String,
    /// Contact first name
    pub first_name: String,
    /// Contact last name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Organisation address
    pub address: Address,
}

impl Customer {
    /// Creates a customer with an empty address
    pub fn new(
        business_name: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: CustomerId::new(),
            business_name: business_name.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            address: Address::default(),
        }
    }

    /// Sets the address
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Country of the organisation address
    pub fn country(&self) -> &str {
        &self.address.country
    }

    /// Full contact name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_street2_joins_and_trims() {
        let address = Address {
            line2: "Building B".to_string(),
            line3: "3rd floor ".to_string(),
            ..Default::default()
        };
        assert_eq!(address.street2(), "Building B\n3rd floor");

        let empty = Address::default();
        assert_eq!(empty.street2(), "");
    }

    #[test]
    fn test_full_name() {
        let customer = Customer::new("Acme", "Ada", "Lovelace", "ada@acme.test");
        assert_eq!(customer.full_name(), "Ada Lovelace");
    }
}
