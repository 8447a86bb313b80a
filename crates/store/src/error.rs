//! Store errors

use amlwatch_alerts::AlertError;
use thiserror::Error;

/// Errors from the SQLite store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Alert {id} changed concurrently: expected status {expected}")]
    Conflict { id: String, expected: String },

    #[error("Invalid stored value in {column}: {value}")]
    Corrupt { column: &'static str, value: String },

    #[error(transparent)]
    Alert(#[from] AlertError),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
