//! Detection configuration with overridable defaults
//!
//! Every field has a serde default, so a config file only needs the values
//! it changes. Defaults reproduce the fixed anomaly constants (10 records,
//! `|z| > 3`) and a conventional sub-10,000 structuring band.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use amlwatch_core::parse_window;

use crate::anomaly::{AnomalyDetector, MIN_HISTORY, Z_THRESHOLD};
use crate::error::{DetectionError, DetectionResult};
use crate::structuring::{StructuringDetector, StructuringParams};

/// Tunable detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    // === Anomaly ===
    /// History records required before the z-score check runs
    #[serde(default = "default_anomaly_min_history")]
    pub anomaly_min_history: usize,

    /// Absolute z-score above which an amount is anomalous
    #[serde(default = "default_anomaly_z_threshold")]
    pub anomaly_z_threshold: f64,

    // === Structuring ===
    /// Trailing window, rule window syntax
    #[serde(default = "default_structuring_window")]
    pub structuring_window: String,

    #[serde(default = "default_structuring_band_low")]
    pub structuring_band_low: Decimal,

    #[serde(default = "default_structuring_band_high")]
    pub structuring_band_high: Decimal,

    #[serde(default = "default_structuring_min_count")]
    pub structuring_min_count: usize,
}

fn default_anomaly_min_history() -> usize {
    MIN_HISTORY
}

fn default_anomaly_z_threshold() -> f64 {
    Z_THRESHOLD
}

fn default_structuring_window() -> String {
    "24h".to_string()
}

fn default_structuring_band_low() -> Decimal {
    Decimal::new(9_000, 0)
}

fn default_structuring_band_high() -> Decimal {
    Decimal::new(999_999, 2) // 9,999.99
}

fn default_structuring_min_count() -> usize {
    3
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            anomaly_min_history: default_anomaly_min_history(),
            anomaly_z_threshold: default_anomaly_z_threshold(),
            structuring_window: default_structuring_window(),
            structuring_band_low: default_structuring_band_low(),
            structuring_band_high: default_structuring_band_high(),
            structuring_min_count: default_structuring_min_count(),
        }
    }
}

impl DetectionConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &std::path::Path) -> DetectionResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every detector parameter
    pub fn validate(&self) -> DetectionResult<()> {
        self.anomaly_detector()?;
        self.structuring_params()?;
        Ok(())
    }

    /// Anomaly detector built from this config; fails on an empty history
    /// requirement or a non-positive threshold
    pub fn anomaly_detector(&self) -> DetectionResult<AnomalyDetector> {
        if self.anomaly_min_history == 0 {
            return Err(DetectionError::Config(
                "anomaly_min_history must be at least 1".to_string(),
            ));
        }
        if !(self.anomaly_z_threshold.is_finite() && self.anomaly_z_threshold > 0.0) {
            return Err(DetectionError::Config(format!(
                "anomaly_z_threshold must be a positive number, got {}",
                self.anomaly_z_threshold
            )));
        }

        Ok(AnomalyDetector::new(self.anomaly_min_history, self.anomaly_z_threshold))
    }

    /// Structuring parameters; fails on a malformed window or an empty band
    pub fn structuring_params(&self) -> DetectionResult<StructuringParams> {
        let window = parse_window(&self.structuring_window)
            .map_err(|e| DetectionError::Config(format!("structuring_window: {e}")))?;

        if self.structuring_band_low > self.structuring_band_high {
            return Err(DetectionError::Config(format!(
                "structuring band is empty: [{}, {}]",
                self.structuring_band_low, self.structuring_band_high
            )));
        }

        Ok(StructuringParams {
            window,
            band_low: self.structuring_band_low,
            band_high: self.structuring_band_high,
            min_count: self.structuring_min_count,
        })
    }

    /// Override structuring settings from a `structuring_pattern_detection`
    /// rule: its window, its threshold as the band ceiling and its
    /// `min_count` when present.
    pub fn apply_structuring_rule(
        &mut self,
        window: &str,
        threshold: Decimal,
        min_count: Option<usize>,
    ) {
        self.structuring_window = window.to_string();
        self.structuring_band_high = threshold;
        if let Some(min_count) = min_count {
            self.structuring_min_count = min_count;
        }
    }

    /// Structuring detector built from this config
    pub fn structuring_detector(&self) -> DetectionResult<StructuringDetector> {
        Ok(StructuringDetector::new(self.structuring_params()?))
    }
}
