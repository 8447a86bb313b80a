//! Amount - Strictly positive decimal wrapper for transaction amounts
//!
//! Every screened transaction carries a positive amount. This is enforced
//! at the type level so detectors never see zero or negative values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when constructing amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount must be greater than 0: {0}")]
    NotPositive(Decimal),
}

/// A strictly positive decimal amount.
///
/// # Invariant
/// The inner value is always > 0. This is enforced by the constructor.
///
/// # Example
/// ```
/// use amlwatch_core::Amount;
/// use rust_decimal::Decimal;
///
/// let amount = Amount::new(Decimal::new(9500, 0)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(9500, 0));
///
/// assert!(Amount::new(Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Create a new Amount from a Decimal.
    ///
    /// Returns an error if the value is zero or negative.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            Err(AmountError::NotPositive(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
