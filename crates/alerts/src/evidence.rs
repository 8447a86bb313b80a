//! Alert evidence payload
//!
//! Alerts carry the transactions that support them. Evidence is typed in
//! memory; on disk it uses the flat legacy object layout:
//!
//! ```text
//! {
//!   "matching_transactions": [ {..tx..}, ... ]   // or a single {..tx..}
//!   "<other key>": <any>                          // free-form attributes
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use amlwatch_core::Transaction;

use crate::error::{AlertError, AlertResult};

/// Key holding evidence transactions in the stored layout
pub const MATCHING_TRANSACTIONS_KEY: &str = "matching_transactions";

/// Transactions supporting an alert
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "transactions", rename_all = "snake_case")]
pub enum Evidence {
    /// Only the alert's source transaction is relevant
    #[default]
    SourceOnly,
    /// Explicit list of supporting transactions
    MatchingTransactions(Vec<Transaction>),
}

/// Evidence plus free-form attributes recorded by the detector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDetails {
    pub evidence: Evidence,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl RuleDetails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Details listing supporting transactions
    pub fn with_matching_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            evidence: Evidence::MatchingTransactions(transactions),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Supporting transactions, `&[]` for source-only evidence
    pub fn matching_transactions(&self) -> &[Transaction] {
        match &self.evidence {
            Evidence::MatchingTransactions(txs) => txs,
            Evidence::SourceOnly => &[],
        }
    }

    /// Encode to the stored flat layout
    pub fn to_legacy_value(&self) -> AlertResult<Value> {
        let mut map: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if let Evidence::MatchingTransactions(txs) = &self.evidence {
            let encoded = serde_json::to_value(txs)
                .map_err(|e| AlertError::InvalidRuleDetails(e.to_string()))?;
            map.insert(MATCHING_TRANSACTIONS_KEY.to_string(), encoded);
        }

        Ok(Value::Object(map))
    }

    /// Decode the stored flat layout.
    ///
    /// `matching_transactions` may be a list or a single transaction object.
    /// `null` decodes to empty source-only details.
    pub fn from_legacy_value(value: Value) -> AlertResult<Self> {
        let mut map = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(AlertError::InvalidRuleDetails(format!(
                    "expected an object, got {other}"
                )))
            }
        };

        let evidence = match map.remove(MATCHING_TRANSACTIONS_KEY) {
            None | Some(Value::Null) => Evidence::SourceOnly,
            Some(Value::Array(items)) => Evidence::MatchingTransactions(
                items
                    .into_iter()
                    .map(decode_transaction)
                    .collect::<AlertResult<Vec<_>>>()?,
            ),
            Some(single @ Value::Object(_)) => {
                Evidence::MatchingTransactions(vec![decode_transaction(single)?])
            }
            Some(other) => {
                return Err(AlertError::InvalidRuleDetails(format!(
                    "{MATCHING_TRANSACTIONS_KEY} must be a list or an object, got {other}"
                )))
            }
        };

        Ok(Self {
            evidence,
            attributes: map.into_iter().collect(),
        })
    }
}

fn decode_transaction(value: Value) -> AlertResult<Transaction> {
    serde_json::from_value(value).map_err(|e| AlertError::InvalidRuleDetails(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use amlwatch_core::{Amount, Currency};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn tx(id: &str) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            account_id: "ACC123".to_string(),
            amount: Amount::new(dec!(9500)).unwrap(),
            currency: "USD".parse::<Currency>().unwrap(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            source_country: "USA".to_string(),
            destination_country: "USA".to_string(),
            transaction_type: "deposit".to_string(),
            status: "completed".to_string(),
        }
    }

    fn legacy_tx(id: &str) -> Value {
        json!({
            "transaction_id": id,
            "account_id": "ACC123",
            "amount": "9500",
            "currency": "USD",
            "timestamp": "2024-03-01T10:00:00Z",
            "source_country": "USA",
            "destination_country": "USA",
            "transaction_type": "deposit",
            "status": "completed"
        })
    }

    #[test]
    fn test_legacy_list() {
        let value = json!({ "matching_transactions": [legacy_tx("T1"), legacy_tx("T2")] });
        let details = RuleDetails::from_legacy_value(value).unwrap();

        assert_eq!(details.matching_transactions(), &[tx("T1"), tx("T2")]);
        assert!(details.attributes.is_empty());
    }

    #[test]
    fn test_legacy_single_object() {
        let value = json!({ "matching_transactions": legacy_tx("T1"), "z_score": 4.2 });
        let details = RuleDetails::from_legacy_value(value).unwrap();

        assert_eq!(details.evidence, Evidence::MatchingTransactions(vec![tx("T1")]));
        assert_eq!(details.attributes["z_score"], json!(4.2));
    }

    #[test]
    fn test_legacy_without_evidence() {
        let details = RuleDetails::from_legacy_value(json!({ "rule_id": "r1" })).unwrap();
        assert_eq!(details.evidence, Evidence::SourceOnly);
        assert!(details.matching_transactions().is_empty());

        assert_eq!(RuleDetails::from_legacy_value(Value::Null).unwrap(), RuleDetails::default());
    }

    #[test]
    fn test_legacy_rejects_bad_shapes() {
        assert!(RuleDetails::from_legacy_value(json!([1, 2])).is_err());
        assert!(RuleDetails::from_legacy_value(json!({ "matching_transactions": "T1" })).is_err());
        assert!(matches!(
            RuleDetails::from_legacy_value(json!({ "matching_transactions": [{ "id": 1 }] })),
            Err(AlertError::InvalidRuleDetails(_))
        ));
    }

    #[test]
    fn test_legacy_encoding_survives_storage() {
        let details = RuleDetails::with_matching_transactions(vec![tx("T1")])
            .with_attribute("rule_id", "structuring_pattern_detection");

        let stored = details.to_legacy_value().unwrap();
        assert_eq!(stored[MATCHING_TRANSACTIONS_KEY].as_array().map(Vec::len), Some(1));
        assert_eq!(stored["rule_id"], json!("structuring_pattern_detection"));

        assert_eq!(RuleDetails::from_legacy_value(stored).unwrap(), details);
    }

    #[test]
    fn test_legacy_encoding_keeps_every_evidence_transaction() {
        let details = RuleDetails::with_matching_transactions(vec![tx("T1"), tx("T2"), tx("T3")]);
        let stored = details.to_legacy_value().unwrap();

        let ids: Vec<_> = stored[MATCHING_TRANSACTIONS_KEY]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["transaction_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["T1", "T2", "T3"]);

        let source_only = RuleDetails::new().to_legacy_value().unwrap();
        assert!(source_only.get(MATCHING_TRANSACTIONS_KEY).is_none());
    }
}
