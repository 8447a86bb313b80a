//! Detection errors

use thiserror::Error;

/// Errors from the detectors
#[derive(Debug, Error)]
pub enum DetectionError {
    /// The check could not run. This is not the same as "no anomaly".
    #[error("insufficient transaction history for anomaly detection (requires at least {required} transactions, got {actual})")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read detection config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse detection config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl DetectionError {
    /// True when the check was skipped for lack of data
    pub fn is_insufficient_history(&self) -> bool {
        matches!(self, DetectionError::InsufficientHistory { .. })
    }
}

/// Result type for detection operations
pub type DetectionResult<T> = Result<T, DetectionError>;
