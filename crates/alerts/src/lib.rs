//! AmlWatch Alerts
//!
//! ```text
//! finding ──► AlertGenerator ──► Alert { status: OPEN }
//!                                   │
//!            operator actions ──► AlertLifecycle::transition
//!
//! OPEN ──► INVESTIGATING ──► ESCALATED ──► CLOSED
//!                      └───► FALSE_POSITIVE
//! ```
//!
//! ## Key Components
//!
//! - [`alert::Alert`] - The case record, with [`alert::AlertType`], [`alert::Priority`], [`alert::AlertStatus`]
//! - [`evidence::RuleDetails`] - Typed evidence payload carried through storage
//! - [`generator::AlertGenerator`] - Priority lookup and risk score
//! - [`lifecycle::AlertLifecycle`] - Transition validation

pub mod alert;
pub mod error;
pub mod evidence;
pub mod generator;
pub mod lifecycle;

pub use alert::{Alert, AlertStatus, AlertType, Priority};
pub use error::{AlertError, AlertResult};
pub use evidence::{Evidence, RuleDetails, MATCHING_TRANSACTIONS_KEY};
pub use generator::{risk_score, AlertGenerator};
pub use lifecycle::AlertLifecycle;
