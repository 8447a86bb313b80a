//! Alert errors

use thiserror::Error;

use crate::alert::AlertStatus;

/// Errors from alert generation and lifecycle transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    #[error("invalid alert type: {0}")]
    InvalidAlertType(String),

    #[error("Configuration error: unknown alert status: {0}")]
    UnknownStatus(String),

    #[error("invalid status transition: cannot transition from {from} to {to}")]
    InvalidTransition { from: AlertStatus, to: AlertStatus },

    #[error("invalid rule details: {0}")]
    InvalidRuleDetails(String),
}

/// Result type for alert operations
pub type AlertResult<T> = Result<T, AlertError>;
