//! Rule records and rule-file loading
//!
//! A rule file is a JSON array of [`Rule`] records. Loading is all or
//! nothing: one bad rule rejects the whole file.

use std::collections::HashSet;
use std::path::Path;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use amlwatch_core::parse_window;

use crate::error::{RuleError, RuleResult};

/// A single AML threshold rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier, also selects the built-in check
    pub rule_id: String,
    /// Display name
    pub name: String,
    /// Threshold that must be exceeded (strictly) to fire
    pub threshold_value: Decimal,
    /// Trailing window, e.g. `"24h"`
    pub time_window: String,
    pub enabled: bool,
    /// Minimum occurrence count, only meaningful for pattern rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_count: Option<usize>,
}

impl Rule {
    pub fn new(
        rule_id: impl Into<String>,
        name: impl Into<String>,
        threshold_value: Decimal,
        time_window: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            name: name.into(),
            threshold_value,
            time_window: time_window.into(),
            enabled: true,
            min_count: None,
        }
    }

    /// Builder: disable the rule
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Builder: set the minimum occurrence count
    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = Some(min_count);
        self
    }

    /// Parse the rule window
    pub fn window(&self) -> RuleResult<Duration> {
        parse_window(&self.time_window).map_err(|source| RuleError::InvalidWindow {
            rule_id: self.rule_id.clone(),
            source,
        })
    }
}

/// Validate a rule list: every threshold > 0, every window parses as a
/// non-negative duration, every identifier unique.
pub fn validate_rules(rules: &[Rule]) -> RuleResult<()> {
    let mut seen = HashSet::new();
    for rule in rules {
        if rule.threshold_value <= Decimal::ZERO {
            return Err(RuleError::InvalidThreshold(rule.rule_id.clone()));
        }
        rule.window()?;
        if !seen.insert(rule.rule_id.as_str()) {
            return Err(RuleError::DuplicateRuleId(rule.rule_id.clone()));
        }
    }
    Ok(())
}

/// A validated, ordered set of rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Validate and wrap a rule list
    pub fn new(rules: Vec<Rule>) -> RuleResult<Self> {
        validate_rules(&rules)?;
        Ok(Self { rules })
    }

    /// Parse and validate a JSON rule array
    pub fn from_json(json: &str) -> RuleResult<Self> {
        let rules: Vec<Rule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    /// Load rules from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> RuleResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let set = Self::from_json(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            rules = set.len(),
            enabled = set.enabled().count(),
            "Loaded rule file"
        );
        Ok(set)
    }

    /// Look up a rule by identifier
    pub fn get(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.rule_id == rule_id)
    }

    /// Iterate enabled rules in file order
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }
}
