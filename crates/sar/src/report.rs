//! Report model
//!
//! Totals are accumulated alongside the transaction lists, so
//! `report total == sum of pattern totals` and
//! `pattern total == sum of its transactions` hold by construction.
//! [`SarReport::is_consistent`] re-checks both.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use amlwatch_alerts::AlertType;
use amlwatch_core::{Account, Transaction};

/// Identity of the reported subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub account_id: String,
    pub name: String,
    pub address: String,
    pub date_of_birth: String,
}

impl From<&Account> for Subject {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id.clone(),
            name: account.holder_name.clone(),
            address: account.address.clone(),
            date_of_birth: account.date_of_birth.clone(),
        }
    }
}

/// Transactions sharing one alert type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousActivityPattern {
    pub pattern_description: String,
    pub transactions: Vec<Transaction>,
    pub total_amount: Decimal,
    pub transaction_count: usize,
}

impl SuspiciousActivityPattern {
    pub fn new(alert_type: AlertType) -> Self {
        Self {
            pattern_description: alert_type.description().to_string(),
            transactions: Vec::new(),
            total_amount: Decimal::ZERO,
            transaction_count: 0,
        }
    }

    fn push(&mut self, tx: Transaction) {
        self.total_amount += tx.value();
        self.transaction_count += 1;
        self.transactions.push(tx);
    }
}

/// Suspicious Activity Report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarReport {
    /// `None` when no included transaction's account could be resolved
    pub subject: Option<Subject>,
    /// Earliest included transaction
    pub start_date: DateTime<Utc>,
    /// Latest included transaction
    pub end_date: DateTime<Utc>,
    pub total_suspicious_amount: Decimal,
    pub total_transaction_count: usize,
    pub patterns: BTreeMap<AlertType, SuspiciousActivityPattern>,
}

impl SarReport {
    /// Check the total invariants
    pub fn is_consistent(&self) -> bool {
        let patterns_ok = self.patterns.values().all(|p| {
            p.transaction_count == p.transactions.len()
                && p.total_amount == p.transactions.iter().map(|t| t.value()).sum::<Decimal>()
        });

        patterns_ok
            && self.total_transaction_count
                == self.patterns.values().map(|p| p.transaction_count).sum::<usize>()
            && self.total_suspicious_amount
                == self.patterns.values().map(|p| p.total_amount).sum::<Decimal>()
    }
}

/// Incremental report assembly
#[derive(Debug, Default)]
pub(crate) struct ReportBuilder {
    subject: Option<Subject>,
    span: Option<(DateTime<Utc>, DateTime<Utc>)>,
    total_amount: Decimal,
    total_count: usize,
    patterns: BTreeMap<AlertType, SuspiciousActivityPattern>,
}

impl ReportBuilder {
    pub(crate) fn has_subject(&self) -> bool {
        self.subject.is_some()
    }

    /// Set the subject; first call wins
    pub(crate) fn subject(&mut self, account: &Account) {
        if self.subject.is_none() {
            self.subject = Some(Subject::from(account));
        }
    }

    /// Make sure a pattern entry exists for the alert type
    pub(crate) fn pattern(&mut self, alert_type: AlertType) {
        self.patterns
            .entry(alert_type)
            .or_insert_with(|| SuspiciousActivityPattern::new(alert_type));
    }

    pub(crate) fn add(&mut self, alert_type: AlertType, tx: Transaction) {
        self.span = Some(match self.span {
            None => (tx.timestamp, tx.timestamp),
            Some((start, end)) => (start.min(tx.timestamp), end.max(tx.timestamp)),
        });
        self.total_amount += tx.value();
        self.total_count += 1;

        self.patterns
            .entry(alert_type)
            .or_insert_with(|| SuspiciousActivityPattern::new(alert_type))
            .push(tx);
    }

    /// Finish the report, `None` when no transaction was added
    pub(crate) fn build(self) -> Option<SarReport> {
        let (start_date, end_date) = self.span?;
        Some(SarReport {
            subject: self.subject,
            start_date,
            end_date,
            total_suspicious_amount: self.total_amount,
            total_transaction_count: self.total_count,
            patterns: self.patterns,
        })
    }
}
