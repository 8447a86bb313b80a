//! Lookup interface the aggregator reads through
//!
//! Each lookup takes a set of identifiers and returns the entries it found.
//! A missing identifier is simply absent from the result, never an error.

use std::collections::HashMap;

use amlwatch_alerts::{Alert, AlertType, RuleDetails};
use amlwatch_core::{Account, Transaction};

use crate::error::SarResult;

/// The alert fields the aggregator needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecord {
    pub id: String,
    pub alert_type: AlertType,
    pub transaction_id: String,
    pub rule_details: RuleDetails,
}

impl From<&Alert> for AlertRecord {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id.clone(),
            alert_type: alert.alert_type,
            transaction_id: alert.transaction_id.clone(),
            rule_details: alert.rule_details.clone(),
        }
    }
}

impl From<Alert> for AlertRecord {
    fn from(alert: Alert) -> Self {
        AlertRecord::from(&alert)
    }
}

/// Read-only case data lookups
pub trait CaseStore {
    fn fetch_alerts(&self, ids: &[String]) -> SarResult<HashMap<String, AlertRecord>>;

    fn fetch_transactions(&self, ids: &[String]) -> SarResult<HashMap<String, Transaction>>;

    fn fetch_accounts(&self, ids: &[String]) -> SarResult<HashMap<String, Account>>;
}

/// Map-backed store for tests and in-process callers
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    alerts: HashMap<String, AlertRecord>,
    transactions: HashMap<String, Transaction>,
    accounts: HashMap<String, Account>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_alert(&mut self, alert: impl Into<AlertRecord>) {
        let record = alert.into();
        self.alerts.insert(record.id.clone(), record);
    }

    pub fn insert_transaction(&mut self, tx: Transaction) {
        self.transactions.insert(tx.transaction_id.clone(), tx);
    }

    pub fn insert_account(&mut self, account: Account) {
        self.accounts.insert(account.account_id.clone(), account);
    }
}

fn select<T: Clone>(source: &HashMap<String, T>, ids: &[String]) -> HashMap<String, T> {
    ids.iter()
        .filter_map(|id| source.get(id).map(|v| (id.clone(), v.clone())))
        .collect()
}

impl CaseStore for InMemoryStore {
    fn fetch_alerts(&self, ids: &[String]) -> SarResult<HashMap<String, AlertRecord>> {
        Ok(select(&self.alerts, ids))
    }

    fn fetch_transactions(&self, ids: &[String]) -> SarResult<HashMap<String, Transaction>> {
        Ok(select(&self.transactions, ids))
    }

    fn fetch_accounts(&self, ids: &[String]) -> SarResult<HashMap<String, Account>> {
        Ok(select(&self.accounts, ids))
    }
}
