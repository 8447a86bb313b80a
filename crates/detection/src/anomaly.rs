//! Amount anomaly detection
//!
//! Population mean and standard deviation of the historical amounts, then
//! `z = (amount - mean) / stddev`; anomalous when `|z| > 3`.
//!
//! Under zero variance the z-score is undefined: an amount equal to the mean
//! is normal, anything else is anomalous with `z = +inf`.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use amlwatch_core::Transaction;

use crate::error::{DetectionError, DetectionResult};

/// Minimum history length for the check to run
pub const MIN_HISTORY: usize = 10;

/// Absolute z-score above which an amount is anomalous
pub const Z_THRESHOLD: f64 = 3.0;

/// Outcome of one anomaly check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyOutcome {
    pub is_anomaly: bool,
    pub z_score: f64,
}

/// Z-score outlier check over an account's history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyDetector {
    min_history: usize,
    z_threshold: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            min_history: MIN_HISTORY,
            z_threshold: Z_THRESHOLD,
        }
    }
}

impl AnomalyDetector {
    pub fn new(min_history: usize, z_threshold: f64) -> Self {
        Self {
            min_history,
            z_threshold,
        }
    }

    pub fn min_history(&self) -> usize {
        self.min_history
    }

    pub fn z_threshold(&self) -> f64 {
        self.z_threshold
    }

    /// Check `current` against `history` (any order).
    ///
    /// Fails with [`DetectionError::InsufficientHistory`] when fewer than
    /// `min_history` records (and never fewer than one) are supplied.
    pub fn detect(
        &self,
        current: &Transaction,
        history: &[Transaction],
    ) -> DetectionResult<AnomalyOutcome> {
        let required = self.min_history.max(1);
        if history.len() < required {
            return Err(DetectionError::InsufficientHistory {
                required,
                actual: history.len(),
            });
        }

        let amounts: Vec<f64> = history.iter().map(to_f64).collect();
        let n = amounts.len() as f64;
        let mean = amounts.iter().sum::<f64>() / n;
        let variance = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        // Uniformity is decided on the exact amounts; float drift must not
        // turn a constant history into a tiny non-zero deviation.
        let first = history[0].value();
        let outcome = if history.iter().all(|t| t.value() == first) {
            if current.value() == first {
                AnomalyOutcome {
                    is_anomaly: false,
                    z_score: 0.0,
                }
            } else {
                AnomalyOutcome {
                    is_anomaly: true,
                    z_score: f64::INFINITY,
                }
            }
        } else {
            let z_score = (to_f64(current) - mean) / std_dev;
            AnomalyOutcome {
                is_anomaly: z_score.abs() > self.z_threshold,
                z_score,
            }
        };

        tracing::debug!(
            transaction_id = %current.transaction_id,
            mean,
            std_dev,
            z_score = outcome.z_score,
            is_anomaly = outcome.is_anomaly,
            "Amount anomaly check"
        );

        Ok(outcome)
    }
}

fn to_f64(tx: &Transaction) -> f64 {
    tx.value().to_f64().unwrap_or(f64::MAX)
}
