//! Transactions and the ingestion validation contract
//!
//! Detectors assume every [`Transaction`] went through
//! [`NewTransaction::validate`]: required fields present, amount > 0,
//! currency a normalized 3-letter code.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::Amount;
use crate::currency::{Currency, CurrencyError};

/// Errors raised by the ingestion contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Amount must be greater than 0: {0}")]
    NonPositiveAmount(Decimal),

    #[error("Invalid currency: {0}")]
    InvalidCurrency(#[from] CurrencyError),
}

/// A screened transaction. Immutable once created; identity is `transaction_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub account_id: String,
    pub amount: Amount,
    pub currency: Currency,
    pub timestamp: DateTime<Utc>,
    pub source_country: String,
    pub destination_country: String,
    pub transaction_type: String,
    pub status: String,
}

impl Transaction {
    /// Amount as a plain decimal
    #[inline]
    pub fn value(&self) -> Decimal {
        self.amount.value()
    }
}

/// Transaction description as received at the ingestion boundary.
///
/// Every field is optional so that a missing field is reported by name
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_country: Option<String>,
    #[serde(default)]
    pub destination_country: Option<String>,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

impl NewTransaction {
    /// Validate and materialize a [`Transaction`].
    ///
    /// A missing identifier is replaced by a fresh UUID; a missing timestamp
    /// is replaced by `now`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<Transaction, ValidationError> {
        let account_id = required(self.account_id, "account_id")?;
        let currency = required(self.currency, "currency")?;
        let source_country = required(self.source_country, "source_country")?;
        let destination_country = required(self.destination_country, "destination_country")?;
        let transaction_type = required(self.transaction_type, "transaction_type")?;
        let status = required(self.status, "status")?;

        let raw_amount = self.amount.ok_or(ValidationError::MissingField("amount"))?;
        let amount =
            Amount::new(raw_amount).map_err(|_| ValidationError::NonPositiveAmount(raw_amount))?;

        let currency: Currency = currency.parse()?;

        let transaction_id = match self.transaction_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => uuid::Uuid::new_v4().to_string(),
        };

        Ok(Transaction {
            transaction_id,
            account_id,
            amount,
            currency,
            timestamp: self.timestamp.unwrap_or(now),
            source_country,
            destination_country,
            transaction_type,
            status,
        })
    }
}
