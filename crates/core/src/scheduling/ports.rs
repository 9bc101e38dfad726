//! Port interfaces for the scheduling engine
//!
//! These traits define the boundaries between core business logic and
//! infrastructure implementations. The core never talks to storage or
//! delivery directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use praxis_domain::{
    Appointment, AvailabilityRule, BookingPolicy, Interval, RescheduleToken, Result,
    TransitionStamps, WorkflowStatus,
};
use uuid::Uuid;

/// Read access to a provider's recurring availability and booking policy.
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Rules for one provider and one day-of-week (Monday = 0 contract).
    async fn rules_for_day(&self, provider_id: Uuid, day_of_week: u8)
        -> Result<Vec<AvailabilityRule>>;

    /// The provider's booking policy. `NotFound` if the provider is unknown.
    async fn booking_policy(&self, provider_id: Uuid) -> Result<BookingPolicy>;
}

/// Persistence for appointments.
///
/// Concurrency contract: `insert_appointment` must fail atomically with
/// `PraxisError::SlotTaken` if committing would create an appointment whose
/// interval overlaps an existing non-cancelled appointment for the same
/// provider. The orchestrator's conflict pre-check is advisory; this write is
/// what closes the check-then-act race.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>>;

    /// Appointments whose start instant falls within `range`, any status.
    async fn appointments_in_range(
        &self,
        provider_id: Uuid,
        range: Interval,
    ) -> Result<Vec<Appointment>>;

    async fn insert_appointment(&self, appointment: &Appointment) -> Result<()>;

    /// Write a new lifecycle status together with the stamps the transition
    /// mandated. Absent stamp fields are left untouched.
    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: WorkflowStatus,
        stamps: &TransitionStamps,
    ) -> Result<()>;
}

/// Persistence for reschedule tokens.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn insert_token(&self, token: &RescheduleToken) -> Result<()>;

    async fn find_token(&self, value: &str) -> Result<Option<RescheduleToken>>;

    /// Atomic redemption: in one critical section, stamp `redeemed_at` on the
    /// token (only if it is not yet redeemed) and move its appointment to
    /// `[start, end)`, re-checking the exclusion contract. Either both writes
    /// commit or neither does: a `SlotTaken` loss leaves the token unredeemed,
    /// and exactly one of N concurrent calls for the same token succeeds; the
    /// rest fail with `TokenAlreadyUsed`.
    async fn redeem_and_move(
        &self,
        value: &str,
        redeemed_at: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<()>;
}

/// Outbound notification dispatch, invoked after a state change succeeds.
///
/// Dispatch is fire-and-forget with respect to the mutation that triggered
/// it: a failure here is logged by the caller and never rolls anything back.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn booking_created(
        &self,
        appointment: &Appointment,
        token: &RescheduleToken,
    ) -> Result<()>;

    async fn appointment_rescheduled(&self, appointment: &Appointment) -> Result<()>;

    async fn status_changed(&self, appointment: &Appointment, from: WorkflowStatus) -> Result<()>;
}
