//! AmlWatch Store - SQLite persistence
//!
//! Tables `accounts`, `transactions` and `alerts`. [`SqliteStore`] also
//! serves the SAR aggregator through [`amlwatch_sar::CaseStore`].

pub mod error;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;
