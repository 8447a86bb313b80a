//! Screening pipeline
//!
//! ```text
//! Transaction ──┬─► RuleEngine ──────────► THRESHOLD_VIOLATION (per rule)
//!               ├─► AnomalyDetector ─────► ANOMALY_DETECTED
//!               └─► StructuringDetector ─► STRUCTURING_PATTERN
//! ```
//!
//! History is the account's stored transactions before the new one. The
//! structuring pool additionally contains the new transaction, and a
//! structuring alert is raised only when that transaction is part of the
//! matched set.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use amlwatch_alerts::{Alert, AlertGenerator, AlertType, RuleDetails};
use amlwatch_core::Transaction;
use amlwatch_detection::{
    AnomalyDetector, AnomalyOutcome, DetectionConfig, DetectionError, StructuringDetector,
};
use amlwatch_rules::{RuleEngine, RuleSet};
use amlwatch_store::SqliteStore;

/// Rule id whose window, threshold and `min_count` drive structuring
pub const STRUCTURING_RULE_ID: &str = "structuring_pattern_detection";

/// Whether the anomaly check could run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AnomalyCheck {
    Ran { is_anomaly: bool, z_score: Option<f64> },
    InsufficientHistory { required: usize, actual: usize },
}

/// Outcome of screening one transaction
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub transaction: Transaction,
    pub anomaly_check: AnomalyCheck,
    pub alerts: Vec<Alert>,
}

/// All detectors wired together
pub struct Screener {
    engine: RuleEngine,
    anomaly: AnomalyDetector,
    structuring: StructuringDetector,
    generator: AlertGenerator,
}

impl Screener {
    /// Build from a rule set and detection config.
    ///
    /// An enabled `structuring_pattern_detection` rule overrides the
    /// structuring window, band ceiling and minimum count.
    pub fn new(rules: RuleSet, mut config: DetectionConfig) -> anyhow::Result<Self> {
        if let Some(rule) = rules.get(STRUCTURING_RULE_ID).filter(|r| r.enabled) {
            config.apply_structuring_rule(&rule.time_window, rule.threshold_value, rule.min_count);
        }

        Ok(Self {
            anomaly: config.anomaly_detector()?,
            structuring: config.structuring_detector()?,
            engine: RuleEngine::new(rules),
            generator: AlertGenerator::new(),
        })
    }

    /// Screen `tx`, store it and any alerts it raises
    pub fn screen(
        &self,
        store: &SqliteStore,
        tx: Transaction,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ScreeningReport> {
        let history = store.account_history(&tx.account_id)?;
        let mut alerts = Vec::new();

        for violation in self.engine.evaluate_at(&tx, &history, now)? {
            let details = RuleDetails::new()
                .with_attribute("rule_id", violation.rule_id.clone())
                .with_attribute("actual_value", violation.actual_value.to_string())
                .with_attribute("threshold_value", violation.threshold_value.to_string());
            alerts.push(self.generator.generate_at(&tx, AlertType::ThresholdViolation, details, now));
        }

        let anomaly_check = match self.anomaly.detect(&tx, &history) {
            Ok(AnomalyOutcome { is_anomaly, z_score }) => {
                if is_anomaly {
                    let details = RuleDetails::new().with_attribute("z_score", z_score_value(z_score));
                    alerts.push(self.generator.generate_at(&tx, AlertType::AnomalyDetected, details, now));
                }
                AnomalyCheck::Ran {
                    is_anomaly,
                    z_score: z_score.is_finite().then_some(z_score),
                }
            }
            Err(DetectionError::InsufficientHistory { required, actual }) => {
                tracing::warn!(
                    transaction_id = %tx.transaction_id,
                    required,
                    actual,
                    "Anomaly check skipped: insufficient history"
                );
                AnomalyCheck::InsufficientHistory { required, actual }
            }
            Err(e) => return Err(e.into()),
        };

        store.insert_transaction(&tx)?;

        let mut pool = history;
        pool.push(tx.clone());
        let outcome = self.structuring.detect_at(&tx.account_id, &pool, now);
        let screened_matches = outcome
            .transactions()
            .iter()
            .any(|t| t.transaction_id == tx.transaction_id);
        if screened_matches {
            let details = RuleDetails::with_matching_transactions(outcome.into_transactions())
                .with_attribute("rule_id", STRUCTURING_RULE_ID);
            alerts.push(self.generator.generate_at(&tx, AlertType::StructuringPattern, details, now));
        } else if !outcome.transactions().is_empty() {
            tracing::debug!(
                transaction_id = %tx.transaction_id,
                "Structuring pattern already present without this transaction"
            );
        }

        for alert in &alerts {
            store.save_alert(alert)?;
        }

        tracing::info!(
            transaction_id = %tx.transaction_id,
            alerts = alerts.len(),
            "Transaction screened"
        );

        Ok(ScreeningReport {
            transaction: tx,
            anomaly_check,
            alerts,
        })
    }
}

/// JSON cannot carry infinity; the undefined-magnitude case is kept as text
fn z_score_value(z_score: f64) -> Value {
    serde_json::Number::from_f64(z_score)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(z_score.to_string()))
}
