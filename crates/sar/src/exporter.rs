//! SAR Exporter - redacted JSON document
//!
//! Account identifiers are masked to their last four characters and every
//! timestamp is rendered as RFC 3339. Files are written through a temporary
//! file in the destination directory and renamed into place, owner
//! read/write only.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};

use amlwatch_core::Transaction;

use crate::error::SarResult;
use crate::report::{SarReport, SuspiciousActivityPattern};

const MASK_PREFIX: &str = "XXXX-XXXX-XXXX-";

/// Mask all but the last four characters of an account identifier.
///
/// Identifiers of four characters or fewer are returned unchanged.
pub fn mask_account_number(account: &str) -> String {
    let count = account.chars().count();
    if count <= 4 {
        return account.to_string();
    }
    let tail: String = account.chars().skip(count - 4).collect();
    format!("{MASK_PREFIX}{tail}")
}

fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Serialize)]
struct TransactionDocument<'a> {
    transaction_id: &'a str,
    account_id: String,
    amount: Decimal,
    currency: &'a str,
    timestamp: String,
    source_country: &'a str,
    destination_country: &'a str,
    transaction_type: &'a str,
    status: &'a str,
}

impl<'a> From<&'a Transaction> for TransactionDocument<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            transaction_id: &tx.transaction_id,
            account_id: mask_account_number(&tx.account_id),
            amount: tx.value(),
            currency: tx.currency.code(),
            timestamp: rfc3339(&tx.timestamp),
            source_country: &tx.source_country,
            destination_country: &tx.destination_country,
            transaction_type: &tx.transaction_type,
            status: &tx.status,
        }
    }
}

#[derive(Serialize)]
struct PatternDocument<'a> {
    pattern_description: &'a str,
    transactions: Vec<TransactionDocument<'a>>,
    total_amount: Decimal,
    transaction_count: usize,
}

impl<'a> From<&'a SuspiciousActivityPattern> for PatternDocument<'a> {
    fn from(pattern: &'a SuspiciousActivityPattern) -> Self {
        Self {
            pattern_description: &pattern.pattern_description,
            transactions: pattern.transactions.iter().map(TransactionDocument::from).collect(),
            total_amount: pattern.total_amount,
            transaction_count: pattern.transaction_count,
        }
    }
}

#[derive(Serialize)]
struct SarDocument<'a> {
    subject_account_id: Option<String>,
    subject_name: &'a str,
    subject_address: &'a str,
    subject_date_of_birth: &'a str,
    start_date: String,
    end_date: String,
    total_suspicious_amount: Decimal,
    total_transaction_count: usize,
    patterns: BTreeMap<String, PatternDocument<'a>>,
}

impl<'a> From<&'a SarReport> for SarDocument<'a> {
    fn from(report: &'a SarReport) -> Self {
        let subject = report.subject.as_ref();
        Self {
            subject_account_id: subject.map(|s| mask_account_number(&s.account_id)),
            subject_name: subject.map(|s| s.name.as_str()).unwrap_or_default(),
            subject_address: subject.map(|s| s.address.as_str()).unwrap_or_default(),
            subject_date_of_birth: subject.map(|s| s.date_of_birth.as_str()).unwrap_or_default(),
            start_date: rfc3339(&report.start_date),
            end_date: rfc3339(&report.end_date),
            total_suspicious_amount: report.total_suspicious_amount,
            total_transaction_count: report.total_transaction_count,
            patterns: report
                .patterns
                .iter()
                .map(|(alert_type, pattern)| (alert_type.to_string(), PatternDocument::from(pattern)))
                .collect(),
        }
    }
}

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub bytes: usize,
    /// Hex SHA-256 of the written document
    pub sha256: String,
}

/// Renders and writes reports
#[derive(Debug, Clone, Copy, Default)]
pub struct SarExporter;

impl SarExporter {
    pub fn new() -> Self {
        Self
    }

    /// Pretty-printed, redacted JSON document
    pub fn to_json_string(&self, report: &SarReport) -> SarResult<String> {
        Ok(serde_json::to_string_pretty(&SarDocument::from(report))?)
    }

    /// Write the document to `path`.
    ///
    /// Either the complete document is stored or the destination is left
    /// untouched. The destination directory must already exist.
    pub fn write_to_file(&self, report: &SarReport, path: &Path) -> SarResult<ExportReceipt> {
        let json = self.to_json_string(report)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        restrict_permissions(file.path())?;
        file.persist(path).map_err(|e| e.error)?;

        let receipt = ExportReceipt {
            path: path.to_path_buf(),
            bytes: json.len(),
            sha256: hex::encode(Sha256::digest(json.as_bytes())),
        };

        tracing::info!(
            path = %receipt.path.display(),
            bytes = receipt.bytes,
            sha256 = %receipt.sha256,
            "SAR exported"
        );
        Ok(receipt)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
