//! Temperature scales and decimal parsing for trigger parameters.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Scale a probe reports its readings in.
///
/// Fahrenheit is the canonical scale used when comparing degree deltas
/// across probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureScale {
    #[serde(rename = "C")]
    Celsius,
    #[default]
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureScale {
    /// Convert a temperature *difference* in this scale to Fahrenheit
    /// degrees. Differences carry no zero-point offset.
    #[must_use]
    pub fn delta_to_fahrenheit(self, degrees: f64) -> f64 {
        match self {
            Self::Fahrenheit => degrees,
            Self::Celsius => degrees * 9.0 / 5.0,
        }
    }
}

impl std::fmt::Display for TemperatureScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Celsius => f.write_str("C"),
            Self::Fahrenheit => f.write_str("F"),
        }
    }
}

/// Parse a decimal field that may use a comma as the decimal separator,
/// as submitted by locales that write `65,5` for `65.5`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidNumber`] when the normalized value is not
/// a decimal.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<f64, ParseError> {
    raw.trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| ParseError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}
