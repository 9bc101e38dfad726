//! Mock repository implementations for testing
//!
//! In-memory mocks for all core ports, enabling deterministic unit tests
//! without database dependencies. The appointment mock honors the same
//! exclusion contract the real adapter provides: an insert that would overlap
//! a non-cancelled appointment fails with `SlotTaken`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use praxis_core::scheduling::ports::{
    AppointmentRepository, AvailabilityRepository, NotificationDispatcher, TokenRepository,
};
use praxis_domain::{
    Appointment, AvailabilityRule, BookingPolicy, Interval, PraxisError, RescheduleToken,
    Result as DomainResult, TransitionStamps, WorkflowStatus,
};
use uuid::Uuid;

/// In-memory mock for `AvailabilityRepository`.
#[derive(Clone)]
pub struct MockAvailabilityRepository {
    policies: Arc<Mutex<Vec<BookingPolicy>>>,
    rules: Arc<Mutex<Vec<AvailabilityRule>>>,
}

impl MockAvailabilityRepository {
    pub fn new(policy: BookingPolicy) -> Self {
        Self {
            policies: Arc::new(Mutex::new(vec![policy])),
            rules: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience helper for adding a single rule to the mock.
    pub fn with_rule(self, rule: AvailabilityRule) -> Self {
        self.rules.lock().unwrap().push(rule);
        self
    }
}

#[async_trait]
impl AvailabilityRepository for MockAvailabilityRepository {
    async fn rules_for_day(
        &self,
        provider_id: Uuid,
        day_of_week: u8,
    ) -> DomainResult<Vec<AvailabilityRule>> {
        Ok(self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.provider_id == provider_id && r.day_of_week == day_of_week)
            .cloned()
            .collect())
    }

    async fn booking_policy(&self, provider_id: Uuid) -> DomainResult<BookingPolicy> {
        self.policies
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.provider_id == provider_id)
            .cloned()
            .ok_or_else(|| PraxisError::NotFound(format!("provider {provider_id}")))
    }
}

/// In-memory mock for `AppointmentRepository`.
///
/// Inserts and time updates enforce the non-overlap invariant atomically
/// under one lock, mirroring the conditional-write contract of the real
/// adapter.
#[derive(Default, Clone)]
pub struct MockAppointmentRepository {
    appointments: Arc<Mutex<Vec<Appointment>>>,
}

impl MockAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an appointment without invariant checks (test fixture path).
    pub fn with_appointment(self, appointment: Appointment) -> Self {
        self.appointments.lock().unwrap().push(appointment);
        self
    }

    pub fn get(&self, id: Uuid) -> Option<Appointment> {
        self.appointments.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.appointments.lock().unwrap().len()
    }

    fn overlaps_committed(
        appointments: &[Appointment],
        provider_id: Uuid,
        interval: Interval,
        exclude: Option<Uuid>,
    ) -> bool {
        appointments.iter().any(|a| {
            a.provider_id == provider_id
                && a.status.occupies_slot()
                && Some(a.id) != exclude
                && a.interval().overlaps(&interval)
        })
    }

    /// Conditional time change under the store lock: the exclusion re-check
    /// and the mutation happen together or not at all.
    fn try_move(&self, id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<()> {
        let mut appointments = self.appointments.lock().unwrap();
        let provider_id = appointments
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.provider_id)
            .ok_or_else(|| PraxisError::NotFound(format!("appointment {id}")))?;
        if Self::overlaps_committed(
            &appointments,
            provider_id,
            Interval::new(start, end),
            Some(id),
        ) {
            return Err(PraxisError::SlotTaken);
        }
        for a in appointments.iter_mut().filter(|a| a.id == id) {
            a.start = start;
            a.end = end;
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentRepository for MockAppointmentRepository {
    async fn find_appointment(&self, id: Uuid) -> DomainResult<Option<Appointment>> {
        Ok(self.get(id))
    }

    async fn appointments_in_range(
        &self,
        provider_id: Uuid,
        range: Interval,
    ) -> DomainResult<Vec<Appointment>> {
        Ok(self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                a.provider_id == provider_id && a.start >= range.start && a.start < range.end
            })
            .cloned()
            .collect())
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> DomainResult<()> {
        let mut appointments = self.appointments.lock().unwrap();
        if Self::overlaps_committed(
            &appointments,
            appointment.provider_id,
            appointment.interval(),
            None,
        ) {
            return Err(PraxisError::SlotTaken);
        }
        appointments.push(appointment.clone());
        Ok(())
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: WorkflowStatus,
        stamps: &TransitionStamps,
    ) -> DomainResult<()> {
        let mut appointments = self.appointments.lock().unwrap();
        let appointment = appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| PraxisError::NotFound(format!("appointment {id}")))?;
        appointment.status = status;
        if let Some(at) = stamps.accepted_at {
            appointment.accepted_at = Some(at);
        }
        if let Some(at) = stamps.sent_at {
            appointment.sent_at = Some(at);
        }
        if let Some(at) = stamps.claimed_at {
            appointment.claimed_at = Some(at);
        }
        if let Some(at) = stamps.completed_at {
            appointment.completed_at = Some(at);
        }
        if let Some(at) = stamps.cancelled_at {
            appointment.cancelled_at = Some(at);
        }
        if let Some(on) = stamps.follow_up_due_on {
            appointment.follow_up_due_on = Some(on);
        }
        Ok(())
    }
}

/// In-memory mock for `TokenRepository`.
///
/// Linked to an appointment store so `redeem_and_move` can stamp the token
/// and move its appointment under one token lock, giving the same
/// both-or-neither and exactly-once semantics as the real adapter.
#[derive(Clone)]
pub struct MockTokenRepository {
    tokens: Arc<Mutex<Vec<RescheduleToken>>>,
    appointments: MockAppointmentRepository,
}

impl MockTokenRepository {
    pub fn linked(appointments: MockAppointmentRepository) -> Self {
        Self { tokens: Arc::new(Mutex::new(Vec::new())), appointments }
    }

    pub fn with_token(self, token: RescheduleToken) -> Self {
        self.tokens.lock().unwrap().push(token);
        self
    }

    pub fn get(&self, value: &str) -> Option<RescheduleToken> {
        self.tokens.lock().unwrap().iter().find(|t| t.value == value).cloned()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn insert_token(&self, token: &RescheduleToken) -> DomainResult<()> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn find_token(&self, value: &str) -> DomainResult<Option<RescheduleToken>> {
        Ok(self.get(value))
    }

    async fn redeem_and_move(
        &self,
        value: &str,
        redeemed_at: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut tokens = self.tokens.lock().unwrap();
        let token = tokens
            .iter_mut()
            .find(|t| t.value == value)
            .ok_or(PraxisError::TokenNotFound)?;
        if token.redeemed_at.is_some() {
            return Err(PraxisError::TokenAlreadyUsed);
        }
        // Stamp only after the move commits; a lost slot race leaves the
        // token unredeemed.
        self.appointments.try_move(token.appointment_id, start, end)?;
        token.redeemed_at = Some(redeemed_at);
        Ok(())
    }
}

/// Notification mock that counts dispatches and can be made to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    pub bookings: AtomicUsize,
    pub reschedules: AtomicUsize,
    pub status_changes: AtomicUsize,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every dispatch fails, for verifying fire-and-forget semantics.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    fn outcome(&self, counter: &AtomicUsize) -> DomainResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(PraxisError::Notification("delivery channel unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn booking_created(
        &self,
        _appointment: &Appointment,
        _token: &RescheduleToken,
    ) -> DomainResult<()> {
        self.outcome(&self.bookings)
    }

    async fn appointment_rescheduled(&self, _appointment: &Appointment) -> DomainResult<()> {
        self.outcome(&self.reschedules)
    }

    async fn status_changed(
        &self,
        _appointment: &Appointment,
        _from: WorkflowStatus,
    ) -> DomainResult<()> {
        self.outcome(&self.status_changes)
    }
}
