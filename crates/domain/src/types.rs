//! Common data types used throughout the scheduling core

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_domain_status_conversions;

/// Lifecycle status of a review appointment.
///
/// The set is closed; legal transitions between statuses are governed by the
/// workflow transition table in `praxis-core`, which is the single source of
/// truth for reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Pending,
    Accepted,
    Scheduled,
    DataEntry,
    Interview,
    ReportDraft,
    ReportReady,
    Sent,
    Claimed,
    FollowUpDue,
    Completed,
    Cancelled,
}

impl_domain_status_conversions!(WorkflowStatus {
    Pending => "pending",
    Accepted => "accepted",
    Scheduled => "scheduled",
    DataEntry => "data_entry",
    Interview => "interview",
    ReportDraft => "report_draft",
    ReportReady => "report_ready",
    Sent => "sent",
    Claimed => "claimed",
    FollowUpDue => "follow_up_due",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl WorkflowStatus {
    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// A cancelled appointment no longer occupies its time interval.
    pub fn occupies_slot(self) -> bool {
        self != Self::Cancelled
    }
}

/// Half-open absolute time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Half-open overlap: `self.start < other.end && self.end > other.start`.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// True when `other` lies entirely within `self`.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// One recurring weekly availability window for a provider.
///
/// `day_of_week` uses the frozen Monday = 0 contract shared with rule
/// storage. Multiple rules may exist per provider per day; they need not be
/// contiguous or disjoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub provider_id: Uuid,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub enabled: bool,
}

/// Per-provider booking policy. Read-mostly; mutated by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPolicy {
    pub provider_id: Uuid,
    /// IANA zone name the provider schedules in (e.g. "America/Toronto").
    pub timezone: String,
    pub default_duration_minutes: u32,
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    pub allow_public_booking: bool,
    pub require_approval: bool,
    /// Reschedule-token validity override; falls back to the global default
    /// from `SchedulingConfig` when absent.
    pub token_validity_days: Option<u32>,
}

/// A scheduled review appointment.
///
/// The core only mutates `start`/`end`, `status`, and the stamp fields after
/// creation. Invariant: a non-cancelled appointment occupies its interval
/// exclusively, modulo buffers, against every other non-cancelled appointment
/// for the same provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: WorkflowStatus,
    /// Externally-visible calendar reference, if one exists.
    pub calendar_ref: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Derived follow-up date, stamped on entering `Claimed`.
    pub follow_up_due_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// Single-use, time-limited credential authorizing one time change for one
/// appointment. Never reassigned; retained after redemption for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleToken {
    /// Opaque random value, unique across all tokens.
    pub value: String,
    pub appointment_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl RescheduleToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_redeemed(&self) -> bool {
        self.redeemed_at.is_some()
    }
}

/// Which entry point a booking request arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingChannel {
    /// Unauthenticated self-booking; gated by `allow_public_booking`.
    Public,
    /// Operator-authenticated direct booking.
    Operator,
}

/// A request to book a new review appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub channel: BookingChannel,
    /// Per-request duration override; policy default when absent.
    pub duration_minutes: Option<u32>,
    pub calendar_ref: Option<String>,
}

/// Result of a successful booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub appointment_id: Uuid,
    pub token: RescheduleToken,
    pub initial_status: WorkflowStatus,
}

/// Result of a successful token redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleOutcome {
    pub appointment_id: Uuid,
    pub new_start: DateTime<Utc>,
    pub new_end: DateTime<Utc>,
}

/// Timestamps written as a side effect of a workflow transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionStamps {
    pub accepted_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub follow_up_due_on: Option<NaiveDate>,
}

impl TransitionStamps {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
