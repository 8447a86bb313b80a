//! Rule configuration errors

use amlwatch_core::WindowError;
use thiserror::Error;

/// Errors from rule loading and evaluation.
///
/// All of these are configuration errors: a rule set that produces one must
/// not be used for screening.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("threshold_value must be > 0 for rule '{0}'")]
    InvalidThreshold(String),

    #[error("invalid time_window for rule '{rule_id}': {source}")]
    InvalidWindow {
        rule_id: String,
        #[source]
        source: WindowError,
    },

    #[error("duplicate rule_id: '{0}'")]
    DuplicateRuleId(String),

    #[error("Failed to read rule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse rule file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for rule operations
pub type RuleResult<T> = Result<T, RuleError>;
