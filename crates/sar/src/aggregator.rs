//! SAR Aggregator - merges alerts into one report
//!
//! ```text
//! alert ids ─► fetch_alerts ─► evidence tx ids ─(dedup)─► fetch_transactions
//!                                                               │
//!                      subject ◄─ fetch_accounts ◄─ account ids ┘
//!
//! per alert, in input order:
//!   evidence txs (or the source tx) ─► pattern[alert_type] + report totals
//! ```
//!
//! Transaction ids are deduplicated only for the store lookup. A transaction
//! cited by two alerts is counted once per alert in the totals.

use std::collections::{HashMap, HashSet};

use amlwatch_alerts::Evidence;
use amlwatch_core::Transaction;

use crate::error::{SarError, SarResult};
use crate::report::{ReportBuilder, SarReport};
use crate::store::{AlertRecord, CaseStore};

/// Builds reports from stored alerts
pub struct SarAggregator<'a, S: CaseStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: CaseStore + ?Sized> SarAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Aggregate the given alerts into a report.
    ///
    /// Alerts are processed in the order given; unknown alert ids and
    /// unresolvable transactions are skipped with a warning. The subject is
    /// the first account that resolves, checking each alert's source
    /// transaction before its evidence.
    pub fn aggregate(&self, alert_ids: &[String]) -> SarResult<SarReport> {
        if alert_ids.is_empty() {
            return Err(SarError::EmptyAlertList);
        }

        let alert_ids = dedup(alert_ids.iter().cloned());
        let mut found = self.store.fetch_alerts(&alert_ids)?;

        let alerts: Vec<AlertRecord> = alert_ids
            .iter()
            .filter_map(|id| {
                let alert = found.remove(id);
                if alert.is_none() {
                    tracing::warn!(alert_id = %id, "Alert not found, skipping");
                }
                alert
            })
            .collect();

        let tx_ids = dedup(alerts.iter().flat_map(|a| {
            std::iter::once(a.transaction_id.clone()).chain(evidence_ids(a))
        }));
        let transactions = self.store.fetch_transactions(&tx_ids)?;

        let account_ids = dedup(tx_ids
            .iter()
            .filter_map(|id| transactions.get(id))
            .map(|t| t.account_id.clone()));
        let accounts = self.store.fetch_accounts(&account_ids)?;

        let mut builder = ReportBuilder::default();

        for alert in &alerts {
            if !builder.has_subject() {
                let account = std::iter::once(alert.transaction_id.clone())
                    .chain(evidence_ids(alert))
                    .filter_map(|id| transactions.get(&id))
                    .find_map(|t| accounts.get(&t.account_id));
                if let Some(account) = account {
                    builder.subject(account);
                }
            }

            builder.pattern(alert.alert_type);
            for tx in resolve_evidence(alert, &transactions) {
                builder.add(alert.alert_type, tx);
            }
        }

        let report = builder
            .build()
            .ok_or_else(|| SarError::NothingToReport(alert_ids.clone()))?;

        tracing::info!(
            alerts = alerts.len(),
            patterns = report.patterns.len(),
            total_amount = %report.total_suspicious_amount,
            total_count = report.total_transaction_count,
            "SAR aggregated"
        );
        Ok(report)
    }
}

/// Evidence transaction ids, or the source id when the alert has no list
fn evidence_ids(alert: &AlertRecord) -> Vec<String> {
    match &alert.rule_details.evidence {
        Evidence::MatchingTransactions(txs) => {
            txs.iter().map(|t| t.transaction_id.clone()).collect()
        }
        Evidence::SourceOnly => vec![alert.transaction_id.clone()],
    }
}

fn resolve_evidence(alert: &AlertRecord, transactions: &HashMap<String, Transaction>) -> Vec<Transaction> {
    evidence_ids(alert)
        .into_iter()
        .filter_map(|id| {
            let tx = transactions.get(&id).cloned();
            if tx.is_none() {
                tracing::warn!(
                    alert_id = %alert.id,
                    transaction_id = %id,
                    "Evidence transaction not found, skipping"
                );
            }
            tx
        })
        .collect()
}

/// Remove duplicates, keeping first occurrence order
fn dedup(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
