//! SQLite storage for case data
//!
//! Amounts are stored as decimal text and timestamps as fixed-width RFC 3339
//! text, so `ORDER BY timestamp` is chronological. Alert rule details are
//! stored in the flat legacy JSON layout.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use amlwatch_alerts::{Alert, AlertStatus, AlertType, Priority, RuleDetails};
use amlwatch_core::{Account, Amount, Currency, Transaction};
use amlwatch_sar::{AlertRecord, CaseStore, SarError, SarResult};

use crate::error::{StoreError, StoreResult};

const TRANSACTION_COLUMNS: &str = "transaction_id, account_id, amount, currency, timestamp,
     source_country, destination_country, transaction_type, status";

const ALERT_COLUMNS: &str = "id, transaction_id, alert_type, priority, score, created_at,
     status, assigned_to, rule_details, transitioned_at";

/// SQLite-backed store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS accounts (
                account_id TEXT PRIMARY KEY,
                holder_name TEXT NOT NULL,
                address TEXT NOT NULL,
                date_of_birth TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS transactions (
                transaction_id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                amount TEXT NOT NULL,
                currency TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                source_country TEXT NOT NULL,
                destination_country TEXT NOT NULL,
                transaction_type TEXT NOT NULL,
                status TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_account
                ON transactions(account_id, timestamp);

            CREATE TABLE IF NOT EXISTS alerts (
                id TEXT PRIMARY KEY,
                transaction_id TEXT NOT NULL,
                alert_type TEXT NOT NULL,
                priority TEXT NOT NULL,
                score REAL NOT NULL,
                created_at TEXT NOT NULL,
                status TEXT NOT NULL,
                assigned_to TEXT,
                rule_details TEXT NOT NULL,
                transitioned_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_alerts_status ON alerts(status);",
        )?;
        Ok(())
    }

    /// Insert or replace account reference data
    pub fn insert_account(&self, account: &Account) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO accounts (account_id, holder_name, address, date_of_birth)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                account.account_id,
                account.holder_name,
                account.address,
                account.date_of_birth,
            ],
        )?;
        Ok(())
    }

    /// Insert a transaction. Transactions are immutable; a duplicate id fails.
    pub fn insert_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO transactions
             (transaction_id, account_id, amount, currency, timestamp,
              source_country, destination_country, transaction_type, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                tx.transaction_id,
                tx.account_id,
                tx.value().to_string(),
                tx.currency.code(),
                timestamp_text(&tx.timestamp),
                tx.source_country,
                tx.destination_country,
                tx.transaction_type,
                tx.status,
            ],
        )?;
        tracing::debug!(transaction_id = %tx.transaction_id, "Transaction stored");
        Ok(())
    }

    /// All transactions of an account, oldest first
    pub fn account_history(&self, account_id: &str) -> StoreResult<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE account_id = ?1 ORDER BY timestamp ASC"
        ))?;

        let rows = stmt
            .query_map(params![account_id], TransactionRow::read)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(TransactionRow::into_transaction).collect()
    }

    /// Insert or replace an alert
    pub fn save_alert(&self, alert: &Alert) -> StoreResult<()> {
        let rule_details = serde_json::to_string(&alert.rule_details.to_legacy_value()?)?;

        self.conn.execute(
            "INSERT OR REPLACE INTO alerts
             (id, transaction_id, alert_type, priority, score, created_at,
              status, assigned_to, rule_details, transitioned_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                alert.id,
                alert.transaction_id,
                alert.alert_type.to_string(),
                alert.priority.to_string(),
                alert.score,
                timestamp_text(&alert.created_at),
                alert.status.to_string(),
                alert.assigned_to,
                rule_details,
                alert.transitioned_at.as_ref().map(timestamp_text),
            ],
        )?;
        Ok(())
    }

    /// Get an alert by ID
    pub fn load_alert(&self, id: &str) -> StoreResult<Alert> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = ?1"),
                params![id],
                AlertRow::read,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        row.into_alert()
    }

    /// Persist a transitioned alert if its stored status is still `expected`.
    ///
    /// Guards against lost updates when two operators move the same alert.
    pub fn update_alert_status(&self, alert: &Alert, expected: AlertStatus) -> StoreResult<()> {
        let rows = self.conn.execute(
            "UPDATE alerts SET status = ?1, assigned_to = ?2, transitioned_at = ?3
             WHERE id = ?4 AND status = ?5",
            params![
                alert.status.to_string(),
                alert.assigned_to,
                alert.transitioned_at.as_ref().map(timestamp_text),
                alert.id,
                expected.to_string(),
            ],
        )?;

        if rows == 0 {
            self.load_alert(&alert.id)?;
            return Err(StoreError::Conflict {
                id: alert.id.clone(),
                expected: expected.to_string(),
            });
        }
        Ok(())
    }

    /// Alerts in a given status, newest first
    pub fn list_alerts_by_status(&self, status: AlertStatus) -> StoreResult<Vec<Alert>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE status = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt
            .query_map(params![status.to_string()], AlertRow::read)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(AlertRow::into_alert).collect()
    }

    fn select_in<T>(
        &self,
        sql_prefix: &str,
        ids: &[String],
        read: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> StoreResult<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = sql_prefix.replace("{ids}", &placeholders);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(ids.iter()), read)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl CaseStore for SqliteStore {
    fn fetch_alerts(&self, ids: &[String]) -> SarResult<HashMap<String, AlertRecord>> {
        let rows = self
            .select_in(
                &format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id IN ({{ids}})"),
                ids,
                AlertRow::read,
            )
            .map_err(SarError::store)?;

        rows.into_iter()
            .map(|row| {
                let alert = row.into_alert().map_err(SarError::store)?;
                Ok((alert.id.clone(), AlertRecord::from(alert)))
            })
            .collect()
    }

    fn fetch_transactions(&self, ids: &[String]) -> SarResult<HashMap<String, Transaction>> {
        let rows = self
            .select_in(
                &format!(
                    "SELECT {TRANSACTION_COLUMNS} FROM transactions
                     WHERE transaction_id IN ({{ids}}) ORDER BY timestamp ASC"
                ),
                ids,
                TransactionRow::read,
            )
            .map_err(SarError::store)?;

        rows.into_iter()
            .map(|row| {
                let tx = row.into_transaction().map_err(SarError::store)?;
                Ok((tx.transaction_id.clone(), tx))
            })
            .collect()
    }

    fn fetch_accounts(&self, ids: &[String]) -> SarResult<HashMap<String, Account>> {
        let accounts = self
            .select_in(
                "SELECT account_id, holder_name, address, date_of_birth
                 FROM accounts WHERE account_id IN ({ids})",
                ids,
                |row| {
                    Ok(Account {
                        account_id: row.get(0)?,
                        holder_name: row.get(1)?,
                        address: row.get(2)?,
                        date_of_birth: row.get(3)?,
                    })
                },
            )
            .map_err(SarError::store)?;

        Ok(accounts
            .into_iter()
            .map(|a| (a.account_id.clone(), a))
            .collect())
    }
}

/// Fixed-width RFC 3339 with nanoseconds: lossless and sorts chronologically
fn timestamp_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(column: &'static str, value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| corrupt(column, value))
}

fn corrupt(column: &'static str, value: &str) -> StoreError {
    StoreError::Corrupt {
        column,
        value: value.to_string(),
    }
}

/// Raw `transactions` row
struct TransactionRow {
    transaction_id: String,
    account_id: String,
    amount: String,
    currency: String,
    timestamp: String,
    source_country: String,
    destination_country: String,
    transaction_type: String,
    status: String,
}

impl TransactionRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            transaction_id: row.get(0)?,
            account_id: row.get(1)?,
            amount: row.get(2)?,
            currency: row.get(3)?,
            timestamp: row.get(4)?,
            source_country: row.get(5)?,
            destination_country: row.get(6)?,
            transaction_type: row.get(7)?,
            status: row.get(8)?,
        })
    }

    fn into_transaction(self) -> StoreResult<Transaction> {
        let amount = Decimal::from_str(&self.amount)
            .ok()
            .and_then(|d| Amount::new(d).ok())
            .ok_or_else(|| corrupt("transactions.amount", &self.amount))?;
        let currency = Currency::from_str(&self.currency)
            .map_err(|_| corrupt("transactions.currency", &self.currency))?;
        let timestamp = parse_timestamp("transactions.timestamp", &self.timestamp)?;

        Ok(Transaction {
            transaction_id: self.transaction_id,
            account_id: self.account_id,
            amount,
            currency,
            timestamp,
            source_country: self.source_country,
            destination_country: self.destination_country,
            transaction_type: self.transaction_type,
            status: self.status,
        })
    }
}

/// Raw `alerts` row
struct AlertRow {
    id: String,
    transaction_id: String,
    alert_type: String,
    priority: String,
    score: f64,
    created_at: String,
    status: String,
    assigned_to: Option<String>,
    rule_details: String,
    transitioned_at: Option<String>,
}

impl AlertRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            transaction_id: row.get(1)?,
            alert_type: row.get(2)?,
            priority: row.get(3)?,
            score: row.get(4)?,
            created_at: row.get(5)?,
            status: row.get(6)?,
            assigned_to: row.get(7)?,
            rule_details: row.get(8)?,
            transitioned_at: row.get(9)?,
        })
    }

    fn into_alert(self) -> StoreResult<Alert> {
        let alert_type = AlertType::parse_code(&self.alert_type)?;
        let status = AlertStatus::parse_code(&self.status)?;
        let priority = Priority::from_str(&self.priority)
            .map_err(|_| corrupt("alerts.priority", &self.priority))?;
        let rule_details = RuleDetails::from_legacy_value(serde_json::from_str(&self.rule_details)?)?;
        let created_at = parse_timestamp("alerts.created_at", &self.created_at)?;
        let transitioned_at = self
            .transitioned_at
            .as_deref()
            .map(|ts| parse_timestamp("alerts.transitioned_at", ts))
            .transpose()?;

        Ok(Alert {
            id: self.id,
            transaction_id: self.transaction_id,
            alert_type,
            priority,
            score: self.score,
            created_at,
            status,
            assigned_to: self.assigned_to,
            rule_details,
            transitioned_at,
        })
    }
}
