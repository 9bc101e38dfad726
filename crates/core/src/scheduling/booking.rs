//! Booking orchestration
//!
//! Composes civil time conversion, availability resolution, and conflict
//! detection to validate and commit a new appointment, then seeds the review
//! workflow and issues a reschedule token.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use praxis_domain::{
    constants::MAX_OCCUPANCY_MINUTES, Appointment, BookingChannel, BookingConfirmation,
    BookingPolicy, BookingRequest, Interval, PraxisError, Result, SchedulingConfig,
    WorkflowStatus,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::availability::AvailabilityService;
use super::civil;
use super::conflict::ConflictService;
use super::ports::{
    AppointmentRepository, AvailabilityRepository, NotificationDispatcher, TokenRepository,
};
use super::reschedule;

/// Booking orchestrator.
///
/// The public and operator entry points share one procedure; they differ only
/// in whether the `allow_public_booking` policy gate applies. Neither path
/// bypasses availability or conflict rules.
pub struct BookingService {
    availability: AvailabilityService,
    conflicts: ConflictService,
    rules: Arc<dyn AvailabilityRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    tokens: Arc<dyn TokenRepository>,
    notifier: Arc<dyn NotificationDispatcher>,
    config: SchedulingConfig,
}

impl BookingService {
    pub fn new(
        rules: Arc<dyn AvailabilityRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        tokens: Arc<dyn TokenRepository>,
        notifier: Arc<dyn NotificationDispatcher>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            availability: AvailabilityService::new(Arc::clone(&rules)),
            conflicts: ConflictService::new(Arc::clone(&appointments)),
            rules,
            appointments,
            tokens,
            notifier,
            config,
        }
    }

    /// Validate and commit a new appointment.
    ///
    /// On success one appointment and one reschedule token are persisted and
    /// a notification is dispatched. Notification failure is logged and never
    /// rolls back the committed booking.
    pub async fn create_booking(&self, request: BookingRequest) -> Result<BookingConfirmation> {
        let policy = self.rules.booking_policy(request.provider_id).await?;

        if request.channel == BookingChannel::Public && !policy.allow_public_booking {
            return Err(PraxisError::MalformedInput(
                "public self-booking is disabled for this provider".into(),
            ));
        }

        let duration = request.duration_minutes.unwrap_or(policy.default_duration_minutes);
        let slot = validate_candidate(
            &self.availability,
            &self.conflicts,
            &policy,
            request.date,
            request.time,
            duration,
            None,
        )
        .await?;

        let now = Utc::now();
        let initial_status = if policy.require_approval {
            WorkflowStatus::Pending
        } else {
            WorkflowStatus::Scheduled
        };

        let appointment = Appointment {
            id: Uuid::new_v4(),
            provider_id: request.provider_id,
            start: slot.start,
            end: slot.end,
            status: initial_status,
            calendar_ref: request.calendar_ref,
            accepted_at: None,
            sent_at: None,
            claimed_at: None,
            completed_at: None,
            cancelled_at: None,
            follow_up_due_on: None,
            created_at: now,
        };

        // The repository enforces the exclusion invariant atomically; a
        // concurrent booking that won the race surfaces here as SlotTaken.
        self.appointments.insert_appointment(&appointment).await?;

        let validity_days =
            policy.token_validity_days.unwrap_or(self.config.token_validity_days);
        let token = reschedule::mint_token(appointment.id, validity_days, now);
        self.tokens.insert_token(&token).await?;

        if let Err(err) = self.notifier.booking_created(&appointment, &token).await {
            warn!(error = %err, appointment_id = %appointment.id, "booking notification failed");
        }

        info!(
            appointment_id = %appointment.id,
            provider_id = %request.provider_id,
            status = %initial_status,
            "appointment booked"
        );

        Ok(BookingConfirmation { appointment_id: appointment.id, token, initial_status })
    }
}

/// Shared slot validation: the civil-time, availability, and conflict steps
/// of the booking procedure. Token redemption re-runs exactly this.
pub(crate) async fn validate_candidate(
    availability: &AvailabilityService,
    conflicts: &ConflictService,
    policy: &BookingPolicy,
    date: NaiveDate,
    time: NaiveTime,
    duration_minutes: u32,
    exclude: Option<Uuid>,
) -> Result<Interval> {
    if duration_minutes == 0 {
        return Err(PraxisError::MalformedInput("appointment duration must be positive".into()));
    }

    // Conflict search is scoped to one civil day; an appointment plus its
    // buffers must fit inside one.
    let occupancy =
        duration_minutes + policy.buffer_before_minutes + policy.buffer_after_minutes;
    if occupancy >= MAX_OCCUPANCY_MINUTES {
        return Err(PraxisError::MalformedInput(format!(
            "duration plus buffers ({occupancy} minutes) must stay under a civil day"
        )));
    }

    let zone = civil::parse_zone(&policy.timezone)?;
    let start = civil::local_to_absolute(date, time, zone)?;
    let end = civil::add_minutes(start, i64::from(duration_minutes));
    let candidate = Interval::new(start, end);

    if !availability.is_within_availability(policy.provider_id, date, candidate, zone).await? {
        return Err(PraxisError::OutsideAvailability);
    }

    if conflicts
        .has_conflict(
            policy.provider_id,
            candidate,
            policy.buffer_before_minutes,
            policy.buffer_after_minutes,
            date,
            zone,
            exclude,
        )
        .await?
    {
        return Err(PraxisError::SlotTaken);
    }

    Ok(candidate)
}
