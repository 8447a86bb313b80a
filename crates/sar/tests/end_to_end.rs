//! Structuring scenario from rule file to exported report

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use amlwatch_alerts::{AlertGenerator, AlertLifecycle, AlertStatus, AlertType, Priority, RuleDetails};
use amlwatch_core::{Account, NewTransaction, Transaction};
use amlwatch_detection::DetectionConfig;
use amlwatch_rules::{RuleEngine, RuleSet};
use amlwatch_sar::{InMemoryStore, SarAggregator, SarExporter};

const RULES: &str = r#"[
    {
        "rule_id": "single_transaction_exceeds_10000",
        "name": "Single transaction over 10,000",
        "threshold_value": 10000,
        "time_window": "0s",
        "enabled": true
    },
    {
        "rule_id": "structuring_pattern_detection",
        "name": "Structuring pattern",
        "threshold_value": 27000,
        "time_window": "12h",
        "enabled": true,
        "min_count": 3
    }
]"#;

fn deposit(id: &str, amount: Decimal, at: DateTime<Utc>, now: DateTime<Utc>) -> Transaction {
    NewTransaction {
        transaction_id: Some(id.to_string()),
        account_id: Some("ACC123".to_string()),
        amount: Some(amount),
        currency: Some("usd".to_string()),
        timestamp: Some(at),
        source_country: Some("USA".to_string()),
        destination_country: Some("USA".to_string()),
        transaction_type: Some("deposit".to_string()),
        status: Some("completed".to_string()),
    }
    .validate(now)
    .unwrap()
}

#[test]
fn test_structuring_to_sar() {
    let now = Utc::now();
    let rules = RuleSet::from_json(RULES).unwrap();

    let deposits = vec![
        deposit("S1", dec!(9000), now - Duration::hours(3), now),
        deposit("S2", dec!(9500), now - Duration::hours(2), now),
        deposit("S3", dec!(9800), now - Duration::hours(1), now),
    ];

    // None of the deposits crosses the single-transaction ceiling
    let engine = RuleEngine::new(rules.clone());
    for (i, tx) in deposits.iter().enumerate() {
        let violations = engine.evaluate_at(tx, &deposits[..i], now).unwrap();
        assert!(violations.is_empty());
    }

    let rule = rules.get("structuring_pattern_detection").unwrap();
    let mut config = DetectionConfig {
        structuring_band_low: dec!(1),
        ..Default::default()
    };
    config.apply_structuring_rule(&rule.time_window, rule.threshold_value, rule.min_count);

    let outcome = config
        .structuring_detector()
        .unwrap()
        .detect_at("ACC123", &deposits, now);
    assert!(outcome.is_detected());
    assert_eq!(outcome.transactions().len(), 3);
    assert_eq!(outcome.transactions()[0].transaction_id, "S3");

    let representative = outcome.transactions()[0].clone();
    let details = RuleDetails::with_matching_transactions(outcome.into_transactions())
        .with_attribute("rule_id", "structuring_pattern_detection");
    let mut alert = AlertGenerator::new().generate(&representative, AlertType::StructuringPattern, details);
    assert_eq!(alert.priority, Priority::Critical);
    assert_eq!(alert.status, AlertStatus::Open);

    let lifecycle = AlertLifecycle::new();
    lifecycle.transition(&mut alert, AlertStatus::Investigating, Some("analyst-7")).unwrap();
    lifecycle.transition(&mut alert, AlertStatus::Escalated, None).unwrap();
    assert_eq!(alert.assigned_to.as_deref(), Some("analyst-7"));

    let mut store = InMemoryStore::new();
    store.insert_account(Account::new("ACC123", "Jane Doe", "1 Main St, Springfield", "1980-01-01"));
    for tx in deposits {
        store.insert_transaction(tx);
    }
    store.insert_alert(&alert);

    let report = SarAggregator::new(&store).aggregate(&[alert.id.clone()]).unwrap();
    assert_eq!(report.total_suspicious_amount, dec!(28300.00));
    assert_eq!(report.total_transaction_count, 3);
    assert_eq!(report.start_date, now - Duration::hours(3));
    assert_eq!(report.end_date, now - Duration::hours(1));
    assert!(report.is_consistent());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sar.json");
    let receipt = SarExporter::new().write_to_file(&report, &path).unwrap();
    assert_eq!(receipt.path, path);

    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["subject_name"], "Jane Doe");
    assert_eq!(doc["total_transaction_count"], 3);
    assert_eq!(doc["total_suspicious_amount"].as_str().unwrap().parse::<Decimal>().unwrap(), dec!(28300));

    let txs = doc["patterns"]["STRUCTURING_PATTERN"]["transactions"].as_array().unwrap();
    assert_eq!(txs.len(), 3);
    assert!(txs.iter().all(|t| t["account_id"] == "XXXX-XXXX-XXXX-C123"));
}

#[test]
fn test_alert_type_and_status_strings_are_validated() {
    let now = Utc::now();
    let tx = deposit("S1", dec!(9000), now - Duration::hours(1), now);

    assert!(AlertGenerator::new()
        .generate_from_code(&tx, "LARGE_CASH", RuleDetails::new())
        .is_err());

    let mut alert = AlertGenerator::new()
        .generate_from_code(&tx, "ANOMALY_DETECTED", RuleDetails::new())
        .unwrap();
    assert!(AlertLifecycle::new()
        .transition_from_code(&mut alert, "OPENED", "INVESTIGATING", None)
        .is_err());
    assert_eq!(alert.status, AlertStatus::Open);
}
