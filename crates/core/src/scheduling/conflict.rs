//! Conflict detection
//!
//! Determines whether a candidate interval collides with any existing
//! committed appointment once protective buffers are applied.
//!
//! Precondition: the search is scoped to the candidate's civil day, which
//! assumes no appointment plus its buffers crosses a civil-day boundary. The
//! booking orchestrator enforces `duration + buffers < 24h` so this holds.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use praxis_domain::{Interval, Result};
use tracing::debug;
use uuid::Uuid;

use super::civil;
use super::ports::AppointmentRepository;

/// Buffered-overlap conflict detector.
pub struct ConflictService {
    appointments: Arc<dyn AppointmentRepository>,
}

impl ConflictService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointments }
    }

    /// True iff `candidate` intersects any existing non-cancelled appointment
    /// on `date`, after expanding each existing appointment by the buffers.
    ///
    /// Buffers protect the *existing* appointment: its interval is widened by
    /// `buffer_before`/`buffer_after` minutes before the half-open overlap
    /// test. `exclude` lets a reschedule ignore the appointment being moved.
    pub async fn has_conflict(
        &self,
        provider_id: Uuid,
        candidate: Interval,
        buffer_before_minutes: u32,
        buffer_after_minutes: u32,
        date: NaiveDate,
        zone: Tz,
        exclude: Option<Uuid>,
    ) -> Result<bool> {
        let bounds = civil::day_bounds(date, zone)?;
        let existing = self.appointments.appointments_in_range(provider_id, bounds).await?;

        let before = Duration::minutes(i64::from(buffer_before_minutes));
        let after = Duration::minutes(i64::from(buffer_after_minutes));

        for appointment in existing {
            if !appointment.status.occupies_slot() {
                continue;
            }
            if exclude == Some(appointment.id) {
                continue;
            }
            let protected =
                Interval::new(appointment.start - before, appointment.end + after);
            if candidate.overlaps(&protected) {
                debug!(
                    provider_id = %provider_id,
                    appointment_id = %appointment.id,
                    "candidate interval collides with protected appointment"
                );
                return Ok(true);
            }
        }
        Ok(false)
    }
}
