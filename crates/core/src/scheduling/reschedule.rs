//! Reschedule token management
//!
//! Issues opaque, expiring, single-use tokens bound to one appointment, and
//! redeems a token exactly once to authorize a time change. A token grants
//! permission to *propose* a new time, never to bypass scheduling rules.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use praxis_domain::{
    constants::TOKEN_VALUE_BYTES, PraxisError, RescheduleOutcome, RescheduleToken, Result,
    SchedulingConfig,
};
use rand::RngCore;
use tracing::{info, warn};
use uuid::Uuid;

use super::availability::AvailabilityService;
use super::booking::validate_candidate;
use super::conflict::ConflictService;
use super::ports::{
    AppointmentRepository, AvailabilityRepository, NotificationDispatcher, TokenRepository,
};

/// Issues and redeems reschedule tokens.
pub struct RescheduleService {
    availability: AvailabilityService,
    conflicts: ConflictService,
    rules: Arc<dyn AvailabilityRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    tokens: Arc<dyn TokenRepository>,
    notifier: Arc<dyn NotificationDispatcher>,
    config: SchedulingConfig,
}

impl RescheduleService {
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

    /// Issue a fresh token for an existing appointment (on-demand path; the
    /// booking orchestrator issues the initial token itself).
    pub async fn issue(&self, appointment_id: Uuid) -> Result<RescheduleToken> {
        let appointment = self
            .appointments
            .find_appointment(appointment_id)
            .await?
            .ok_or_else(|| PraxisError::NotFound(format!("appointment {appointment_id}")))?;

        let policy = self.rules.booking_policy(appointment.provider_id).await?;
        let validity_days =
            policy.token_validity_days.unwrap_or(self.config.token_validity_days);

        let token = mint_token(appointment_id, validity_days, Utc::now());
        self.tokens.insert_token(&token).await?;
        info!(appointment_id = %appointment_id, "reschedule token issued");
        Ok(token)
    }

    /// Redeem a token to move its appointment to a new civil date + time.
    ///
    /// The full booking validation (civil conversion, availability, buffered
    /// conflicts) is re-run against the new time, excluding the appointment
    /// being moved. Only after validation passes is the token consumed, and
    /// consumption commits atomically with the time change, so a rejected
    /// proposal (or a lost slot race) leaves the token usable. The
    /// appointment's workflow status is left untouched.
    pub async fn redeem(
        &self,
        token_value: &str,
        new_date: NaiveDate,
        new_time: NaiveTime,
    ) -> Result<RescheduleOutcome> {
        let token = self
            .tokens
            .find_token(token_value)
            .await?
            .ok_or(PraxisError::TokenNotFound)?;

        let now = Utc::now();
        // Expiry wins over redemption state: an expired token reports
        // TokenExpired whether or not it was ever used.
        if token.is_expired(now) {
            return Err(PraxisError::TokenExpired);
        }
        if token.is_redeemed() {
            return Err(PraxisError::TokenAlreadyUsed);
        }

        let appointment = self
            .appointments
            .find_appointment(token.appointment_id)
            .await?
            .ok_or_else(|| {
                PraxisError::NotFound(format!("appointment {}", token.appointment_id))
            })?;

        let policy = self.rules.booking_policy(appointment.provider_id).await?;
        let duration_minutes =
            u32::try_from((appointment.end - appointment.start).num_minutes())
                .map_err(|_| PraxisError::MalformedInput("invalid appointment duration".into()))?;

        let slot = validate_candidate(
            &self.availability,
            &self.conflicts,
            &policy,
            new_date,
            new_time,
            duration_minutes,
            Some(appointment.id),
        )
        .await?;

        // Single-use enforcement and the time change commit together: losing
        // the slot race here leaves the token unredeemed, and exactly one of
        // N racing redemptions gets past the redemption stamp.
        self.tokens.redeem_and_move(token_value, now, slot.start, slot.end).await?;

        let mut moved = appointment;
        moved.start = slot.start;
        moved.end = slot.end;
        if let Err(err) = self.notifier.appointment_rescheduled(&moved).await {
            warn!(error = %err, appointment_id = %moved.id, "reschedule notification failed");
        }

        info!(appointment_id = %moved.id, new_start = %slot.start, "appointment rescheduled");
        Ok(RescheduleOutcome {
            appointment_id: moved.id,
            new_start: slot.start,
            new_end: slot.end,
        })
    }
}

/// Mint a token bound to one appointment for its entire life.
pub(crate) fn mint_token(
    appointment_id: Uuid,
    validity_days: u32,
    now: DateTime<Utc>,
) -> RescheduleToken {
    RescheduleToken {
        value: generate_token_value(),
        appointment_id,
        issued_at: now,
        expires_at: now + Duration::days(i64::from(validity_days)),
        redeemed_at: None,
    }
}

/// Opaque random token value; 32 bytes of entropy, hex-encoded.
fn generate_token_value() -> String {
    let mut bytes = [0u8; TOKEN_VALUE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
