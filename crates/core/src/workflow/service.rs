//! Workflow transition service

use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use praxis_domain::{PraxisError, Result, SchedulingConfig, TransitionStamps, WorkflowStatus};
use tracing::{info, warn};
use uuid::Uuid;

use super::transitions::{allowed_transitions, can_transition};
use crate::scheduling::ports::{AppointmentRepository, NotificationDispatcher};

/// Applies lifecycle transitions to review appointments.
pub struct WorkflowService {
    appointments: Arc<dyn AppointmentRepository>,
    notifier: Arc<dyn NotificationDispatcher>,
    config: SchedulingConfig,
}

impl WorkflowService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        notifier: Arc<dyn NotificationDispatcher>,
        config: SchedulingConfig,
    ) -> Self {
        Self { appointments, notifier, config }
    }

    /// Move an appointment to `target`, writing any mandated stamps.
    ///
    /// An illegal transition fails with `InvalidTransition` carrying the
    /// allowed set. A self-transition is a legal no-op: nothing is written
    /// and no notification goes out.
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        target: WorkflowStatus,
    ) -> Result<TransitionStamps> {
        let appointment = self
            .appointments
            .find_appointment(appointment_id)
            .await?
            .ok_or_else(|| PraxisError::NotFound(format!("appointment {appointment_id}")))?;

        let from = appointment.status;
        if !can_transition(from, target) {
            return Err(PraxisError::InvalidTransition {
                from,
                to: target,
                allowed: allowed_transitions(from).to_vec(),
            });
        }

        if from == target {
            return Ok(TransitionStamps::default());
        }

        let stamps = stamps_for(target, Utc::now(), self.config.follow_up_months)?;
        self.appointments.update_appointment_status(appointment_id, target, &stamps).await?;

        let mut updated = appointment;
        updated.status = target;
        if let Err(err) = self.notifier.status_changed(&updated, from).await {
            warn!(error = %err, appointment_id = %appointment_id, "status notification failed");
        }

        info!(appointment_id = %appointment_id, from = %from, to = %target, "workflow transition applied");
        Ok(stamps)
    }
}

/// Timestamp writes mandated by entering `target` at `now`.
///
/// Entering `Claimed` also derives the follow-up due date: `now`'s civil date
/// plus `follow_up_months` calendar months. chrono clamps month-end dates, so
/// e.g. August 31 + 6 months lands on the last day of February.
pub(crate) fn stamps_for(
    target: WorkflowStatus,
    now: DateTime<Utc>,
    follow_up_months: u32,
) -> Result<TransitionStamps> {
    let mut stamps = TransitionStamps::default();
    match target {
        WorkflowStatus::Accepted => stamps.accepted_at = Some(now),
        WorkflowStatus::Sent => stamps.sent_at = Some(now),
        WorkflowStatus::Claimed => {
            stamps.claimed_at = Some(now);
            stamps.follow_up_due_on = Some(
                now.date_naive().checked_add_months(Months::new(follow_up_months)).ok_or_else(
                    || PraxisError::MalformedInput("follow-up date out of range".into()),
                )?,
            );
        }
        WorkflowStatus::Completed => stamps.completed_at = Some(now),
        WorkflowStatus::Cancelled => stamps.cancelled_at = Some(now),
        _ => {}
    }
    Ok(stamps)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn accepted_stamps_accepted_at_only() {
        let now = at(2026, 4, 1);
        let stamps = stamps_for(WorkflowStatus::Accepted, now, 6).unwrap();
        assert_eq!(stamps.accepted_at, Some(now));
        assert!(stamps.claimed_at.is_none());
        assert!(stamps.follow_up_due_on.is_none());
    }

    #[test]
    fn intermediate_statuses_stamp_nothing() {
        let stamps = stamps_for(WorkflowStatus::Interview, at(2026, 4, 1), 6).unwrap();
        assert!(stamps.is_empty());
    }

    #[test]
    fn claimed_derives_follow_up_due_date() {
        let stamps = stamps_for(WorkflowStatus::Claimed, at(2026, 4, 15), 6).unwrap();
        assert_eq!(stamps.claimed_at, Some(at(2026, 4, 15)));
        assert_eq!(stamps.follow_up_due_on, Some(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()));
    }

    #[test]
    fn follow_up_clamps_month_end() {
        // August 31 + 6 months: February has no 31st, so the date clamps
        let stamps = stamps_for(WorkflowStatus::Claimed, at(2026, 8, 31), 6).unwrap();
        assert_eq!(stamps.follow_up_due_on, Some(NaiveDate::from_ymd_opt(2027, 2, 28).unwrap()));
    }

    #[test]
    fn cancellation_stamps_cancelled_at() {
        let now = at(2026, 4, 1);
        let stamps = stamps_for(WorkflowStatus::Cancelled, now, 6).unwrap();
        assert_eq!(stamps.cancelled_at, Some(now));
    }
}
