//! CLI commands

use std::path::Path;

use anyhow::Context;
use chrono::Utc;

use amlwatch_alerts::{Alert, AlertLifecycle, AlertStatus};
use amlwatch_core::{Account, NewTransaction};
use amlwatch_detection::DetectionConfig;
use amlwatch_rules::RuleSet;
use amlwatch_sar::{ExportReceipt, SarAggregator, SarExporter};
use amlwatch_store::SqliteStore;

use crate::screening::{Screener, ScreeningReport};

/// Load and validate a rule file
pub fn rules(path: &Path) -> anyhow::Result<RuleSet> {
    let rules = RuleSet::from_file(path)
        .with_context(|| format!("failed to load rules from {}", path.display()))?;

    println!("{} rules loaded ({} enabled)", rules.len(), rules.enabled().count());
    for rule in rules.rules() {
        println!(
            "  {} [{}] threshold={} window={}{}",
            rule.rule_id,
            if rule.enabled { "on" } else { "off" },
            rule.threshold_value,
            rule.time_window,
            rule.min_count.map(|n| format!(" min_count={n}")).unwrap_or_default(),
        );
    }
    Ok(rules)
}

/// Register or update account reference data
pub fn account(store: &SqliteStore, account: Account) -> anyhow::Result<()> {
    store.insert_account(&account)?;
    println!("Account {} saved", account.account_id);
    Ok(())
}

/// Validate, store and screen one transaction read from a JSON file
pub fn screen(
    store: &SqliteStore,
    rules_path: &Path,
    tx_path: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<ScreeningReport> {
    let rules = RuleSet::from_file(rules_path)
        .with_context(|| format!("failed to load rules from {}", rules_path.display()))?;
    let config = match config_path {
        Some(path) => DetectionConfig::from_file(path)
            .with_context(|| format!("failed to load detection config from {}", path.display()))?,
        None => DetectionConfig::default(),
    };

    let raw = std::fs::read_to_string(tx_path)
        .with_context(|| format!("failed to read {}", tx_path.display()))?;
    let new_tx: NewTransaction = serde_json::from_str(&raw)?;
    let tx = new_tx.validate(Utc::now())?;

    let report = Screener::new(rules, config)?.screen(store, tx, Utc::now())?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report)
}

/// Move a stored alert to a new status
pub fn transition(
    store: &SqliteStore,
    alert_id: &str,
    target: &str,
    investigator: Option<&str>,
) -> anyhow::Result<Alert> {
    let mut alert = store.load_alert(alert_id)?;
    let expected = alert.status;
    let target = AlertStatus::parse_code(&target.to_uppercase())?;

    AlertLifecycle::new().transition(&mut alert, target, investigator)?;
    store.update_alert_status(&alert, expected)?;

    println!(
        "Alert {}: {} -> {}{}",
        alert.id,
        expected,
        alert.status,
        alert
            .assigned_to
            .as_deref()
            .map(|a| format!(" (assigned to {a})"))
            .unwrap_or_default(),
    );
    Ok(alert)
}

/// Aggregate alerts into a SAR and write it
pub fn sar(store: &SqliteStore, alert_ids: &[String], out: &Path) -> anyhow::Result<ExportReceipt> {
    let report = SarAggregator::new(store).aggregate(alert_ids)?;
    let receipt = SarExporter::new()
        .write_to_file(&report, out)
        .with_context(|| format!("failed to write SAR to {}", out.display()))?;

    println!(
        "SAR written to {} ({} transactions, total {}, sha256 {})",
        receipt.path.display(),
        report.total_transaction_count,
        report.total_suspicious_amount,
        receipt.sha256
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amlwatch_alerts::AlertType;
    use std::io::Write;

    const RULES: &str = r#"[
        { "rule_id": "single_transaction_exceeds_10000", "name": "Single",
          "threshold_value": 10000, "time_window": "0s", "enabled": true }
    ]"#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_rules_command() {
        let file = write_temp(RULES);
        assert_eq!(rules(file.path()).unwrap().len(), 1);

        let bad = write_temp(r#"[{ "rule_id": "r", "name": "r", "threshold_value": 0, "time_window": "1h", "enabled": true }]"#);
        assert!(rules(bad.path()).is_err());
    }

    #[test]
    fn test_screen_transition_and_sar() {
        let store = SqliteStore::in_memory().unwrap();
        account(&store, Account::new("ACC9", "Jane Doe", "1 Main St", "1980-01-01")).unwrap();

        let rules_file = write_temp(RULES);
        let tx_file = write_temp(
            r#"{ "account_id": "ACC9", "amount": "15000", "currency": "eur",
                 "source_country": "USA", "destination_country": "CYM",
                 "transaction_type": "wire", "status": "completed" }"#,
        );

        let report = screen(&store, rules_file.path(), tx_file.path(), None).unwrap();
        assert_eq!(report.transaction.currency.code(), "EUR");
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].alert_type, AlertType::ThresholdViolation);

        let alert_id = report.alerts[0].id.clone();
        let alert = transition(&store, &alert_id, "investigating", Some("analyst-1")).unwrap();
        assert_eq!(alert.status, AlertStatus::Investigating);
        assert!(transition(&store, &alert_id, "CLOSED", None).is_err());
        assert!(transition(&store, &alert_id, "SHELVED", None).is_err());

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sar.json");
        let receipt = sar(&store, &[alert_id], &out).unwrap();
        assert!(out.exists());
        assert_eq!(receipt.sha256.len(), 64);
    }

    #[test]
    fn test_screen_rejects_invalid_transaction() {
        let store = SqliteStore::in_memory().unwrap();
        let rules_file = write_temp(RULES);
        let tx_file = write_temp(r#"{ "account_id": "ACC9", "amount": "-5", "currency": "USD" }"#);

        assert!(screen(&store, rules_file.path(), tx_file.path(), None).is_err());
    }
}
