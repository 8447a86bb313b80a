//! Rule Engine - evaluates enabled rules against one transaction
//!
//! Each enabled rule is dispatched by identifier to a built-in check:
//! - single-transaction ceiling: `amount > threshold`
//! - windowed cumulative sum: history in `(now - window, now)` plus current, `sum > threshold`
//! - windowed count: history in `(now - window, now)` plus one, `count > threshold`
//!
//! Unknown identifiers are skipped so rule files can carry newer rule types.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use amlwatch_core::{within_window, Transaction};

use crate::error::RuleResult;
use crate::rule::{Rule, RuleSet};

/// Built-in check selected by a rule identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    SingleTransactionCeiling,
    WindowedCumulativeSum,
    WindowedCount,
}

impl RuleKind {
    pub const SINGLE_TRANSACTION_ID: &'static str = "single_transaction_exceeds_10000";
    pub const CUMULATIVE_SUM_ID: &'static str = "daily_cumulative_exceeds_50000";
    pub const COUNT_ID: &'static str = "more_than_5_transactions_in_1_hour";

    /// Map a rule identifier to its check, `None` for identifiers this
    /// engine does not know.
    pub fn from_rule_id(rule_id: &str) -> Option<Self> {
        match rule_id {
            Self::SINGLE_TRANSACTION_ID => Some(RuleKind::SingleTransactionCeiling),
            Self::CUMULATIVE_SUM_ID => Some(RuleKind::WindowedCumulativeSum),
            Self::COUNT_ID => Some(RuleKind::WindowedCount),
            _ => None,
        }
    }

    /// Canonical identifier for this check
    pub fn rule_id(&self) -> &'static str {
        match self {
            RuleKind::SingleTransactionCeiling => Self::SINGLE_TRANSACTION_ID,
            RuleKind::WindowedCumulativeSum => Self::CUMULATIVE_SUM_ID,
            RuleKind::WindowedCount => Self::COUNT_ID,
        }
    }
}

/// A rule that fired. Ephemeral, not persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule_id: String,
    /// Observed value (amount, windowed sum or windowed count)
    pub actual_value: Decimal,
    pub threshold_value: Decimal,
}

/// Evaluates a fixed rule list
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    /// Create an engine from a validated rule set
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: rules.into_rules(),
        }
    }

    /// Create an engine from raw rules.
    ///
    /// Rules are not validated up front; a malformed window still aborts
    /// evaluation.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate using the current time as the window end
    pub fn evaluate(
        &self,
        tx: &Transaction,
        history: &[Transaction],
    ) -> RuleResult<Vec<RuleViolation>> {
        self.evaluate_at(tx, history, Utc::now())
    }

    /// Evaluate with an explicit window end.
    ///
    /// Returns one violation per fired rule, in rule order. A malformed
    /// window on any enabled rule aborts the whole evaluation.
    pub fn evaluate_at(
        &self,
        tx: &Transaction,
        history: &[Transaction],
        now: DateTime<Utc>,
    ) -> RuleResult<Vec<RuleViolation>> {
        let mut violations = Vec::new();

        for rule in self.rules.iter().filter(|r| r.enabled) {
            let window = rule.window()?;

            let Some(kind) = RuleKind::from_rule_id(&rule.rule_id) else {
                tracing::debug!(rule_id = %rule.rule_id, "Skipping rule with unknown identifier");
                continue;
            };

            let actual = match kind {
                RuleKind::SingleTransactionCeiling => tx.value(),
                RuleKind::WindowedCumulativeSum => {
                    in_window(history, now, window).map(|t| t.value()).sum::<Decimal>() + tx.value()
                }
                RuleKind::WindowedCount => {
                    Decimal::from(in_window(history, now, window).count() + 1)
                }
            };

            if actual > rule.threshold_value {
                tracing::debug!(
                    rule_id = %rule.rule_id,
                    transaction_id = %tx.transaction_id,
                    actual = %actual,
                    threshold = %rule.threshold_value,
                    "Rule violated"
                );
                violations.push(RuleViolation {
                    rule_id: rule.rule_id.clone(),
                    actual_value: actual,
                    threshold_value: rule.threshold_value,
                });
            }
        }

        Ok(violations)
    }
}

fn in_window<'a>(
    history: &'a [Transaction],
    now: DateTime<Utc>,
    window: Duration,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    history
        .iter()
        .filter(move |t| within_window(t.timestamp, now, window))
}
