//! SAR errors

use thiserror::Error;

/// Errors from report aggregation and export
#[derive(Debug, Error)]
pub enum SarError {
    #[error("no alert identifiers supplied")]
    EmptyAlertList,

    #[error("no transactions could be resolved for alerts: {0:?}")]
    NothingToReport(Vec<String>),

    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SarError {
    /// Wrap a storage collaborator failure
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        SarError::Store(Box::new(err))
    }
}

/// Result type for SAR operations
pub type SarResult<T> = Result<T, SarError>;
