//! Alert lifecycle - status transition validation
//!
//! ```text
//! OPEN ──► INVESTIGATING ──┬──► ESCALATED ──► CLOSED
//!                          └──► FALSE_POSITIVE
//! ```
//!
//! CLOSED and FALSE_POSITIVE are terminal. Callers persisting alerts must
//! serialize concurrent transitions on the same alert themselves.

use chrono::{DateTime, Utc};

use crate::alert::{Alert, AlertStatus};
use crate::error::{AlertError, AlertResult};

/// Applies validated status transitions
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertLifecycle;

impl AlertLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// Transition using the current time as the transition stamp
    pub fn transition(
        &self,
        alert: &mut Alert,
        target: AlertStatus,
        investigator: Option<&str>,
    ) -> AlertResult<()> {
        self.transition_at(alert, target, investigator, Utc::now())
    }

    /// Move `alert` to `target`.
    ///
    /// On success the status and transition time are updated. The assignee is
    /// overwritten only when a non-empty investigator is supplied. On failure
    /// the alert is left untouched.
    pub fn transition_at(
        &self,
        alert: &mut Alert,
        target: AlertStatus,
        investigator: Option<&str>,
        now: DateTime<Utc>,
    ) -> AlertResult<()> {
        let from = alert.status;
        if !from.can_transition_to(target) {
            tracing::warn!(
                alert_id = %alert.id,
                from = %from,
                to = %target,
                "Rejected alert status transition"
            );
            return Err(AlertError::InvalidTransition { from, to: target });
        }

        alert.status = target;
        alert.transitioned_at = Some(now);
        if let Some(investigator) = investigator.filter(|i| !i.is_empty()) {
            alert.assigned_to = Some(investigator.to_string());
        }

        tracing::info!(
            alert_id = %alert.id,
            from = %from,
            to = %target,
            assigned_to = alert.assigned_to.as_deref().unwrap_or(""),
            "Alert status transitioned"
        );
        Ok(())
    }

    /// Transition from status codes as stored or typed by an operator.
    ///
    /// An unknown `current` or `target` code is
    /// [`AlertError::UnknownStatus`]; a stored code that disagrees with the
    /// alert is rejected the same way.
    pub fn transition_from_code(
        &self,
        alert: &mut Alert,
        current: &str,
        target: &str,
        investigator: Option<&str>,
    ) -> AlertResult<()> {
        let current = AlertStatus::parse_code(current)?;
        if current != alert.status {
            return Err(AlertError::UnknownStatus(format!(
                "{current} does not match alert status {}",
                alert.status
            )));
        }
        let target = AlertStatus::parse_code(target)?;
        self.transition(alert, target, investigator)
    }
}
