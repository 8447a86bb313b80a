//! AmlWatch Detectors
//!
//! Stateless detectors over caller-supplied history:
//!
//! - [`anomaly::AnomalyDetector`] - population z-score of the current amount
//! - [`structuring::StructuringDetector`] - repeated sub-threshold deposits in a window
//! - [`config::DetectionConfig`] - tunable parameters (file/JSON, with defaults)
//!
//! Neither detector holds state between calls, so evaluations for different
//! accounts can run in parallel.

pub mod anomaly;
pub mod config;
pub mod error;
pub mod structuring;

pub use anomaly::{AnomalyDetector, AnomalyOutcome};
pub use config::DetectionConfig;
pub use error::{DetectionError, DetectionResult};
pub use structuring::{StructuringDetector, StructuringOutcome, StructuringParams};
