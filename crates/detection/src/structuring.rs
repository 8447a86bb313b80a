//! Structuring ("smurfing") detection
//!
//! Repeated deposits kept inside an amount band, inside a trailing window.
//! When at least `min_count` transactions of the account match, the pattern
//! is detected and the matches are returned most recent first.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use amlwatch_core::{within_window, Transaction};

/// Search parameters for one structuring check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringParams {
    /// Trailing window ending at evaluation time
    pub window: Duration,
    /// Inclusive lower bound of the amount band
    pub band_low: Decimal,
    /// Inclusive upper bound of the amount band
    pub band_high: Decimal,
    /// Matches needed to report the pattern
    pub min_count: usize,
}

/// Result of a structuring check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuringOutcome {
    /// Pattern found; transactions sorted by timestamp descending
    Detected(Vec<Transaction>),
    NotDetected,
}

impl StructuringOutcome {
    pub fn is_detected(&self) -> bool {
        matches!(self, StructuringOutcome::Detected(_))
    }

    /// Matching transactions, empty when not detected
    pub fn transactions(&self) -> &[Transaction] {
        match self {
            StructuringOutcome::Detected(txs) => txs,
            StructuringOutcome::NotDetected => &[],
        }
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        match self {
            StructuringOutcome::Detected(txs) => txs,
            StructuringOutcome::NotDetected => Vec::new(),
        }
    }
}

/// Sliding-window structuring matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringDetector {
    params: StructuringParams,
}

impl StructuringDetector {
    pub fn new(params: StructuringParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &StructuringParams {
        &self.params
    }

    /// Search `pool` using the current time as the window end
    pub fn detect(&self, account_id: &str, pool: &[Transaction]) -> StructuringOutcome {
        self.detect_at(account_id, pool, Utc::now())
    }

    /// Search `pool` for the account with an explicit window end.
    ///
    /// Ties on timestamp are ordered by transaction id so the result does
    /// not depend on the order of `pool`.
    pub fn detect_at(
        &self,
        account_id: &str,
        pool: &[Transaction],
        now: DateTime<Utc>,
    ) -> StructuringOutcome {
        let p = &self.params;

        let mut matches: Vec<Transaction> = pool
            .iter()
            .filter(|t| {
                t.account_id == account_id
                    && within_window(t.timestamp, now, p.window)
                    && t.value() >= p.band_low
                    && t.value() <= p.band_high
            })
            .cloned()
            .collect();

        if matches.len() < p.min_count {
            tracing::debug!(
                account_id,
                matches = matches.len(),
                min_count = p.min_count,
                "Structuring pattern not detected"
            );
            return StructuringOutcome::NotDetected;
        }

        matches.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });

        tracing::info!(
            account_id,
            matches = matches.len(),
            "Structuring pattern detected"
        );
        StructuringOutcome::Detected(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amlwatch_core::{Amount, Currency};
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn tx(id: &str, account: &str, amount: Decimal, timestamp: DateTime<Utc>) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            account_id: account.to_string(),
            amount: Amount::new(amount).unwrap(),
            currency: "USD".parse::<Currency>().unwrap(),
            timestamp,
            source_country: "USA".to_string(),
            destination_country: "USA".to_string(),
            transaction_type: "deposit".to_string(),
            status: "completed".to_string(),
        }
    }

    fn detector() -> StructuringDetector {
        StructuringDetector::new(StructuringParams {
            window: Duration::hours(12),
            band_low: dec!(1),
            band_high: dec!(27000),
            min_count: 3,
        })
    }

    fn pool(now: DateTime<Utc>) -> Vec<Transaction> {
        vec![
            tx("S1", "ACC123", dec!(9000), now - Duration::hours(1)),
            tx("S2", "ACC123", dec!(9500), now - Duration::hours(2)),
            tx("S3", "ACC123", dec!(9800), now - Duration::hours(3)),
            // other account
            tx("B1", "ACC124", dec!(15000), now - Duration::hours(1)),
            // outside window
            tx("B2", "ACC123", dec!(100), now - Duration::hours(13)),
            // outside band
            tx("B3", "ACC123", dec!(30000), now - Duration::hours(4)),
        ]
    }

    #[test]
    fn test_detects_pattern_most_recent_first() {
        let now = Utc::now();
        let outcome = detector().detect_at("ACC123", &pool(now), now);

        assert!(outcome.is_detected());
        let ids: Vec<_> = outcome.transactions().iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_below_min_count() {
        let now = Utc::now();
        let pool: Vec<_> = pool(now).into_iter().filter(|t| t.transaction_id != "S2").collect();

        let outcome = detector().detect_at("ACC123", &pool, now);
        assert_eq!(outcome, StructuringOutcome::NotDetected);
        assert!(outcome.transactions().is_empty());
    }

    #[test]
    fn test_band_is_inclusive() {
        let now = Utc::now();
        let pool = vec![
            tx("LOW", "A", dec!(1), now - Duration::minutes(1)),
            tx("HIGH", "A", dec!(27000), now - Duration::minutes(2)),
            tx("MID", "A", dec!(500), now - Duration::minutes(3)),
        ];
        let outcome = detector().detect_at("A", &pool, now);
        assert_eq!(outcome.transactions().len(), 3);
    }

    #[test]
    fn test_order_independent_of_input_permutation() {
        let now = Utc::now();
        let same_time = now - Duration::minutes(30);
        let mut pool = pool(now);
        pool.push(tx("S4", "ACC123", dec!(9100), same_time));
        pool.push(tx("S0", "ACC123", dec!(9200), same_time));

        let expected = detector().detect_at("ACC123", &pool, now);

        pool.reverse();
        let reversed = detector().detect_at("ACC123", &pool, now);
        pool.rotate_left(3);
        let rotated = detector().detect_at("ACC123", &pool, now);

        assert_eq!(expected, reversed);
        assert_eq!(expected, rotated);

        let ids: HashSet<_> = expected.transactions().iter().map(|t| t.transaction_id.clone()).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(expected.transactions()[0].transaction_id, "S0");
        assert_eq!(expected.transactions()[1].transaction_id, "S4");
    }

    #[test]
    fn test_empty_pool() {
        let outcome = detector().detect_at("ACC123", &[], Utc::now());
        assert!(!outcome.is_detected());
    }
}
