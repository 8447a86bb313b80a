//! AmlWatch SAR - Suspicious Activity Reports
//!
//! ```text
//! alert ids ──► SarAggregator ──(CaseStore lookups)──► SarReport ──► SarExporter ──► file (0600)
//! ```
//!
//! The aggregator merges several alerts into one report grouped by alert
//! type. The exporter masks account identifiers, renders RFC 3339
//! timestamps and writes the document atomically.

pub mod aggregator;
pub mod error;
pub mod exporter;
pub mod report;
pub mod store;

pub use aggregator::SarAggregator;
pub use error::{SarError, SarResult};
pub use exporter::{mask_account_number, ExportReceipt, SarExporter};
pub use report::{SarReport, Subject, SuspiciousActivityPattern};
pub use store::{AlertRecord, CaseStore, InMemoryStore};
