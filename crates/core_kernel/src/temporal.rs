//! Timezone handling
//!
//! Formatting a timestamp for an external system always goes through an
//! explicit [`Timezone`]; nothing in the workspace reads or mutates a
//! process-wide default.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Timezone wrapper for merchant locales
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| CoreError::validation(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Formats a UTC instant as local wall-clock time using a strftime pattern
    pub fn format(&self, utc: DateTime<Utc>, pattern: &str) -> String {
        self.to_local(utc).format(pattern).to_string()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_in_local_time() {
        let tz: Timezone = "Europe/Paris".parse().unwrap();
        let utc = Utc.with_ymd_and_hms(2024, 7, 14, 22, 30, 0).unwrap();

        assert_eq!(tz.format(utc, "%d/%m/%Y %H:%M"), "15/07/2024 00:30");
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        assert!("Mars/Olympus".parse::<Timezone>().is_err());
    }

    #[test]
    fn test_serde_uses_iana_name() {
        let tz = Timezone::new(chrono_tz::America::New_York);
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"America/New_York\"");

        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }
}
