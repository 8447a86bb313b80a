//! Currency - Normalized 3-letter currency codes
//!
//! Input is accepted case-insensitively and stored upper-cased, so `"usd"`
//! and `"USD"` compare equal downstream.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing currencies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Empty currency code")]
    EmptyCode,

    #[error("Currency must be a 3-letter ISO code: {0}")]
    InvalidFormat(String),
}

/// A 3-letter alphabetic currency code, always upper case.
///
/// # Examples
/// ```
/// use amlwatch_core::Currency;
///
/// let usd: Currency = "usd".parse().unwrap();
/// assert_eq!(usd.code(), "USD");
///
/// assert!("USDT".parse::<Currency>().is_err());
/// assert!("U5D".parse::<Currency>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Returns the currency code as a string slice
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CurrencyError::EmptyCode);
        }

        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidFormat(trimmed.to_string()));
        }

        Ok(Currency(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
