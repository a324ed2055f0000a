//! Merchant configuration
//!
//! One [`GatewayConfiguration`] per merchant account. It is read-only to the
//! gateway and safe to share between concurrent charges.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use core_kernel::Timezone;

use crate::classifier::RecoverabilityPolicy;
use crate::error::GatewayError;

/// Provider environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    /// Homologation (testing)
    Test,
    /// Production
    Production,
    /// Production with client certificate authentication
    ProductionCert,
}

impl Environment {
    /// Key used in configuration stores
    pub fn key(&self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Production => "production",
            Environment::ProductionCert => "production-cert",
        }
    }

    /// Environment name understood by the provider SDK
    pub fn sdk_name(&self) -> &'static str {
        match self {
            Environment::Test => "HOMO",
            Environment::Production => "PROD",
            Environment::ProductionCert => "PROD_CC",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Environment::Test => "Homologation (testing)",
            Environment::Production => "Production",
            Environment::ProductionCert => "Production (certificate)",
        }
    }

    pub fn is_production(&self) -> bool {
        !matches!(self, Environment::Test)
    }
}

/// Integration generation of the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayVersion {
    /// Random wallet ids, expiration normalization only
    V1,
    /// Customer-derived wallet ids, full card form validation
    #[default]
    V2,
}

/// How new wallet identifiers are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletIdStrategy {
    /// Random UUID per wallet
    Random,
    /// Derived from the customer and payment mean identifiers
    CustomerDerived,
}

/// Behaviour switches selected by [`GatewayVersion`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub wallet_id_strategy: WalletIdStrategy,
    /// Card number digits are checked before the wallet is created
    pub check_card_number: bool,
}

impl GatewayVersion {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            GatewayVersion::V1 => Capabilities {
                wallet_id_strategy: WalletIdStrategy::Random,
                check_card_number: false,
            },
            GatewayVersion::V2 => Capabilities {
                wallet_id_strategy: WalletIdStrategy::CustomerDerived,
                check_card_number: true,
            },
        }
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_recoverable_codes() -> Vec<String> {
    RecoverabilityPolicy::DEFAULT_CODES
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_transient_messages() -> Vec<String> {
    RecoverabilityPolicy::DEFAULT_MESSAGES
        .iter()
        .map(|m| m.to_string())
        .collect()
}

/// Accepts either a sequence or a comma separated string
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        StringOrList::Many(items) => items,
    })
}

/// Per-merchant gateway settings
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfiguration {
    /// Merchant account identifier
    pub merchant_id: String,
    /// Access key for the merchant account
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Contract number charged against
    pub contract_number: String,
    /// Provider environment
    pub environment: Environment,
    /// Timezone used to format dates sent to the provider
    #[serde(default)]
    pub timezone: Timezone,
    /// Integration generation
    #[serde(default)]
    pub version: GatewayVersion,
    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Payment codes eligible for a retry
    #[serde(default = "default_recoverable_codes", deserialize_with = "string_or_list")]
    pub recoverable_codes: Vec<String>,
    /// Short messages (case-insensitive) eligible for a retry
    #[serde(default = "default_transient_messages", deserialize_with = "string_or_list")]
    pub transient_messages: Vec<String>,
}

impl fmt::Debug for GatewayConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfiguration")
            .field("merchant_id", &self.merchant_id)
            .field("api_key", &"***")
            .field("contract_number", &self.contract_number)
            .field("environment", &self.environment)
            .field("timezone", &self.timezone)
            .field("version", &self.version)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("recoverable_codes", &self.recoverable_codes)
            .field("transient_messages", &self.transient_messages)
            .finish()
    }
}

impl GatewayConfiguration {
    /// Creates a configuration with default timezone, version and retry data
    pub fn new(
        merchant_id: impl Into<String>,
        api_key: impl Into<String>,
        contract_number: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            api_key: api_key.into(),
            contract_number: contract_number.into(),
            environment,
            timezone: Timezone::default(),
            version: GatewayVersion::default(),
            request_timeout_ms: default_timeout_ms(),
            recoverable_codes: default_recoverable_codes(),
            transient_messages: default_transient_messages(),
        }
    }

    /// Loads configuration from `PAYLINE_*` environment variables
    ///
    /// `PAYLINE_MERCHANT_ID`, `PAYLINE_API_KEY`, `PAYLINE_CONTRACT_NUMBER` and
    /// `PAYLINE_ENVIRONMENT` are required. `PAYLINE_RECOVERABLE_CODES` and
    /// `PAYLINE_TRANSIENT_MESSAGES` take comma separated values.
    pub fn from_env() -> Result<Self, GatewayError> {
        let config: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix("PAYLINE"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the timezone
    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Sets the integration generation
    pub fn with_version(mut self, version: GatewayVersion) -> Self {
        self.version = version;
        self
    }

    /// Sets the per-call timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Replaces the recoverable code allow-list
    pub fn with_recoverable_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recoverable_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.version.capabilities()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Retry eligibility rules built from this configuration
    pub fn recoverability_policy(&self) -> RecoverabilityPolicy {
        RecoverabilityPolicy::new(
            self.recoverable_codes.iter().cloned(),
            self.transient_messages.iter().cloned(),
        )
    }

    /// Checks that every required setting is present
    pub fn validate(&self) -> Result<(), GatewayError> {
        let missing: Vec<&str> = [
            ("merchant_id", &self.merchant_id),
            ("api_key", &self.api_key),
            ("contract_number", &self.contract_number),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(GatewayError::configuration(format!(
                "missing required setting(s): {}",
                missing.join(", ")
            )));
        }

        if self.request_timeout_ms == 0 {
            return Err(GatewayError::configuration("request_timeout_ms must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfiguration {
        GatewayConfiguration::new("1234567", "secret", "CB-001", Environment::Test)
    }

    #[test]
    fn test_valid_configuration() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let mut c = config();
        c.merchant_id.clear();
        c.contract_number = "  ".to_string();

        match c.validate() {
            Err(GatewayError::Configuration(msg)) => {
                assert!(msg.contains("merchant_id"));
                assert!(msg.contains("contract_number"));
                assert!(!msg.contains("api_key"));
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_hides_api_key() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let c: GatewayConfiguration = serde_json::from_value(serde_json::json!({
            "merchant_id": "1234567",
            "api_key": "secret",
            "contract_number": "CB-001",
            "environment": "production-cert",
            "recoverable_codes": "01116, 01907"
        }))
        .unwrap();

        assert_eq!(c.environment, Environment::ProductionCert);
        assert_eq!(c.version, GatewayVersion::V2);
        assert_eq!(c.recoverable_codes, vec!["01116", "01907"]);
        assert_eq!(c.request_timeout(), Duration::from_secs(30));
        assert!(!c.transient_messages.is_empty());
    }

    #[test]
    fn test_capabilities_per_version() {
        let v1 = GatewayVersion::V1.capabilities();
        assert_eq!(v1.wallet_id_strategy, WalletIdStrategy::Random);
        assert!(!v1.check_card_number);

        let v2 = GatewayVersion::V2.capabilities();
        assert_eq!(v2.wallet_id_strategy, WalletIdStrategy::CustomerDerived);
        assert!(v2.check_card_number);
    }
}
