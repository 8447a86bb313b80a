//! AmlWatch Rule Engine
//!
//! Static threshold rules loaded once per process from a JSON rule file.
//!
//! ```text
//! rules.json ──► RuleSet::from_file ──► validate (threshold > 0, window, unique id)
//!                                           │
//! Transaction + history ──► RuleEngine::evaluate ──► Vec<RuleViolation>
//! ```
//!
//! ## Key Components
//!
//! - [`rule::Rule`] / [`rule::RuleSet`] - Rule records and whole-file loading
//! - [`engine::RuleKind`] - Closed mapping from rule identifier to built-in check
//! - [`engine::RuleEngine`] - Evaluates enabled rules in file order

pub mod engine;
pub mod error;
pub mod rule;

pub use engine::{RuleEngine, RuleKind, RuleViolation};
pub use error::{RuleError, RuleResult};
pub use rule::{validate_rules, Rule, RuleSet};
