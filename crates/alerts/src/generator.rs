//! Alert generation - priority lookup and risk scoring
//!
//! ```text
//! score = min(100, weight * 0.8 + amount_score * 0.2)
//! amount_score = min(amount, 1_000_000) / 1_000_000 * 20
//! weight: Medium 50, High 75, Critical 100
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use amlwatch_core::Transaction;

use crate::alert::{Alert, AlertStatus, AlertType, Priority};
use crate::error::AlertResult;
use crate::evidence::RuleDetails;

/// Amount at which the amount component of the score saturates
const AMOUNT_CAP: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Risk score for an amount at a given priority, in `[0, 100]`
pub fn risk_score(amount: Decimal, priority: Priority) -> f64 {
    let capped = amount.max(Decimal::ZERO).min(AMOUNT_CAP);
    let amount_score = (capped / AMOUNT_CAP).to_f64().unwrap_or(1.0) * 20.0;
    (priority.weight() * 0.8 + amount_score * 0.2).min(100.0)
}

/// Packages findings into new alerts
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertGenerator;

impl AlertGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Create an Open, unassigned alert stamped with the current time
    pub fn generate(&self, tx: &Transaction, alert_type: AlertType, details: RuleDetails) -> Alert {
        self.generate_at(tx, alert_type, details, Utc::now())
    }

    /// Create an alert with an explicit creation time
    pub fn generate_at(
        &self,
        tx: &Transaction,
        alert_type: AlertType,
        details: RuleDetails,
        now: DateTime<Utc>,
    ) -> Alert {
        let priority = alert_type.priority();
        let score = risk_score(tx.value(), priority);

        let alert = Alert {
            id: Uuid::new_v4().to_string(),
            transaction_id: tx.transaction_id.clone(),
            alert_type,
            priority,
            score,
            created_at: now,
            status: AlertStatus::Open,
            assigned_to: None,
            rule_details: details,
            transitioned_at: None,
        };

        tracing::info!(
            alert_id = %alert.id,
            transaction_id = %alert.transaction_id,
            alert_type = %alert.alert_type,
            priority = %alert.priority,
            score = alert.score,
            "Alert generated"
        );

        alert
    }

    /// Create an alert from an alert type code such as `STRUCTURING_PATTERN`
    pub fn generate_from_code(
        &self,
        tx: &Transaction,
        alert_type: &str,
        details: RuleDetails,
    ) -> AlertResult<Alert> {
        let alert_type = AlertType::parse_code(alert_type)?;
        Ok(self.generate(tx, alert_type, details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AlertError;
    use amlwatch_core::{Amount, Currency};
    use rust_decimal_macros::dec;
    use strum::IntoEnumIterator;

    fn tx(amount: Decimal) -> Transaction {
        Transaction {
            transaction_id: "TX-1".to_string(),
            account_id: "ACC123".to_string(),
            amount: Amount::new(amount).unwrap(),
            currency: "USD".parse::<Currency>().unwrap(),
            timestamp: Utc::now(),
            source_country: "USA".to_string(),
            destination_country: "USA".to_string(),
            transaction_type: "deposit".to_string(),
            status: "completed".to_string(),
        }
    }

    #[test]
    fn test_risk_score_values() {
        assert!((risk_score(dec!(0), Priority::Medium) - 40.0).abs() < 1e-9);
        assert!((risk_score(dec!(500000), Priority::High) - 62.0).abs() < 1e-9);
        assert!((risk_score(dec!(1000000), Priority::Critical) - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_score_caps_amount() {
        assert_eq!(
            risk_score(dec!(1000000), Priority::Critical),
            risk_score(dec!(50000000), Priority::Critical)
        );
    }

    #[test]
    fn test_risk_score_monotonic_and_bounded() {
        let amounts = [dec!(0.01), dec!(9000), dec!(10000), dec!(250000), dec!(999999.99), dec!(2000000)];
        for priority in Priority::iter() {
            let scores: Vec<f64> = amounts.iter().map(|a| risk_score(*a, priority)).collect();
            assert!(scores.windows(2).all(|w| w[0] <= w[1]));
            assert!(scores.iter().all(|s| (0.0..=100.0).contains(s)));
        }
    }

    #[test]
    fn test_generate_new_alert() {
        let generator = AlertGenerator::new();
        let details = RuleDetails::new().with_attribute("rule_id", "single_transaction_exceeds_10000");
        let alert = generator.generate(&tx(dec!(15000)), AlertType::ThresholdViolation, details.clone());

        assert_eq!(alert.transaction_id, "TX-1");
        assert_eq!(alert.priority, Priority::Medium);
        assert_eq!(alert.status, AlertStatus::Open);
        assert_eq!(alert.assigned_to, None);
        assert_eq!(alert.transitioned_at, None);
        assert_eq!(alert.rule_details, details);
        assert!(Uuid::parse_str(&alert.id).is_ok());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let generator = AlertGenerator::new();
        let a = generator.generate(&tx(dec!(1)), AlertType::AnomalyDetected, RuleDetails::new());
        let b = generator.generate(&tx(dec!(1)), AlertType::AnomalyDetected, RuleDetails::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_structuring_outranks_threshold() {
        let generator = AlertGenerator::new();
        let structuring = generator.generate(&tx(dec!(9500)), AlertType::StructuringPattern, RuleDetails::new());
        let threshold = generator.generate(&tx(dec!(9500)), AlertType::ThresholdViolation, RuleDetails::new());

        assert!(structuring.priority > threshold.priority);
        assert!(structuring.score > threshold.score);
    }

    #[test]
    fn test_generate_from_code() {
        let generator = AlertGenerator::new();

        let alert = generator
            .generate_from_code(&tx(dec!(100)), "GEOGRAPHIC_RISK", RuleDetails::new())
            .unwrap();
        assert_eq!(alert.alert_type, AlertType::GeographicRisk);

        let err = generator
            .generate_from_code(&tx(dec!(100)), "SANCTIONS_HIT", RuleDetails::new())
            .unwrap_err();
        assert_eq!(err, AlertError::InvalidAlertType("SANCTIONS_HIT".to_string()));
    }
}
