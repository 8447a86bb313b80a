//! Alert record and its closed enumerations
//!
//! String forms are SCREAMING_SNAKE_CASE codes (`STRUCTURING_PATTERN`,
//! `FALSE_POSITIVE`) shared by serde, storage and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{AlertError, AlertResult};
use crate::evidence::RuleDetails;

/// Kind of finding that produced an alert
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// A static rule threshold was exceeded
    ThresholdViolation,
    /// Amount is a statistical outlier for the account
    AnomalyDetected,
    /// Repeated sub-threshold deposits
    StructuringPattern,
    /// Counterparty or route in a high-risk jurisdiction
    GeographicRisk,
}

impl AlertType {
    /// Parse a stored or user-supplied alert type code
    pub fn parse_code(code: &str) -> AlertResult<Self> {
        code.parse()
            .map_err(|_| AlertError::InvalidAlertType(code.to_string()))
    }

    /// Fixed priority for this alert type
    pub fn priority(&self) -> Priority {
        match self {
            AlertType::ThresholdViolation | AlertType::GeographicRisk => Priority::Medium,
            AlertType::AnomalyDetected => Priority::High,
            AlertType::StructuringPattern => Priority::Critical,
        }
    }

    /// Human-readable pattern description used in reports
    pub fn description(&self) -> &'static str {
        match self {
            AlertType::ThresholdViolation => "Transactions exceeding configured monitoring thresholds",
            AlertType::AnomalyDetected => "Transaction amounts statistically inconsistent with account history",
            AlertType::StructuringPattern => "Repeated sub-threshold deposits consistent with structuring",
            AlertType::GeographicRisk => "Transactions involving high-risk jurisdictions",
        }
    }
}

/// Alert priority, ordered `Medium < High < Critical`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Weight used by the risk score blend
    pub fn weight(&self) -> f64 {
        match self {
            Priority::Medium => 50.0,
            Priority::High => 75.0,
            Priority::Critical => 100.0,
        }
    }
}

/// Case status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Open,
    Investigating,
    Escalated,
    Closed,
    FalsePositive,
}

impl AlertStatus {
    /// Parse a stored status code; unknown values are configuration errors
    pub fn parse_code(code: &str) -> AlertResult<Self> {
        code.parse()
            .map_err(|_| AlertError::UnknownStatus(code.to_string()))
    }

    /// Statuses reachable in one transition
    pub fn successors(&self) -> &'static [AlertStatus] {
        match self {
            AlertStatus::Open => &[AlertStatus::Investigating],
            AlertStatus::Investigating => &[AlertStatus::Escalated, AlertStatus::FalsePositive],
            AlertStatus::Escalated => &[AlertStatus::Closed],
            AlertStatus::Closed | AlertStatus::FalsePositive => &[],
        }
    }

    pub fn can_transition_to(&self, target: AlertStatus) -> bool {
        self.successors().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}

/// A scored, prioritized finding on one transaction.
///
/// Created by [`crate::AlertGenerator`]; status, assignee and transition time
/// change only through [`crate::AlertLifecycle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    /// Source transaction
    pub transaction_id: String,
    pub alert_type: AlertType,
    pub priority: Priority,
    /// Risk score in `[0, 100]`
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub status: AlertStatus,
    pub assigned_to: Option<String>,
    pub rule_details: RuleDetails,
    /// Time of the last status transition, `None` while never transitioned
    pub transitioned_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Medium < Priority::High);
        assert!(Priority::High < Priority::Critical);
    }

    #[test]
    fn test_priority_lookup() {
        assert_eq!(AlertType::ThresholdViolation.priority(), Priority::Medium);
        assert_eq!(AlertType::GeographicRisk.priority(), Priority::Medium);
        assert_eq!(AlertType::AnomalyDetected.priority(), Priority::High);
        assert_eq!(AlertType::StructuringPattern.priority(), Priority::Critical);
    }

    #[test]
    fn test_alert_type_codes() {
        for alert_type in AlertType::iter() {
            let code = alert_type.to_string();
            assert_eq!(AlertType::parse_code(&code).unwrap(), alert_type);
        }
        assert_eq!(AlertType::StructuringPattern.to_string(), "STRUCTURING_PATTERN");
        assert_eq!(
            AlertType::parse_code("HIGH_VALUE_TRANSFER"),
            Err(AlertError::InvalidAlertType("HIGH_VALUE_TRANSFER".to_string()))
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AlertStatus::FalsePositive.to_string(), "FALSE_POSITIVE");
        assert_eq!(AlertStatus::parse_code("INVESTIGATING").unwrap(), AlertStatus::Investigating);
        assert!(matches!(
            AlertStatus::parse_code("ARCHIVED"),
            Err(AlertError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = AlertStatus::iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![AlertStatus::Closed, AlertStatus::FalsePositive]);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&AlertStatus::FalsePositive).unwrap();
        assert_eq!(json, "\"FALSE_POSITIVE\"");
        let parsed: AlertType = serde_json::from_str("\"GEOGRAPHIC_RISK\"").unwrap();
        assert_eq!(parsed, AlertType::GeographicRisk);
    }
}
