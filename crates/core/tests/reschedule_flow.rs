//! Reschedule token integration tests
//!
//! Covers issuance, single-use redemption, expiry, re-validation of the new
//! time against availability and conflict rules, and the concurrent
//! redemption race.

mod support;

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use praxis_core::scheduling::ports::{
    AppointmentRepository, NotificationDispatcher, TokenRepository,
};
use praxis_core::RescheduleService;
use praxis_domain::{
    Appointment, PraxisError, RescheduleToken, SchedulingConfig, WorkflowStatus,
};
use support::repositories::{
    MockAppointmentRepository, MockAvailabilityRepository, MockTokenRepository, RecordingNotifier,
};
use support::{parse_date, parse_time, test_policy, test_rule};
use uuid::Uuid;

/// Mondays in Toronto-EST. 2026-03-02 and 2026-03-09 (the 9th is EDT, UTC-4).
const MONDAY: &str = "2026-03-02";

fn appointment_at(provider_id: Uuid, utc_hour: u32) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        provider_id,
        start: Utc.with_ymd_and_hms(2026, 3, 2, utc_hour, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 2, utc_hour + 1, 0, 0).unwrap(),
        status: WorkflowStatus::Scheduled,
        calendar_ref: None,
        accepted_at: None,
        sent_at: None,
        claimed_at: None,
        completed_at: None,
        cancelled_at: None,
        follow_up_due_on: None,
        created_at: Utc::now(),
    }
}

fn token_for(appointment_id: Uuid, validity_days: i64) -> RescheduleToken {
    let now = Utc::now();
    RescheduleToken {
        value: format!("test-token-{appointment_id}"),
        appointment_id,
        issued_at: now - Duration::days(1),
        expires_at: now + Duration::days(validity_days),
        redeemed_at: None,
    }
}

struct Fixture {
    provider_id: Uuid,
    appointment: Appointment,
    service: RescheduleService,
    appointments: MockAppointmentRepository,
    tokens: MockTokenRepository,
}

fn fixture_base() -> Fixture {
    let provider_id = Uuid::new_v4();
    let policy = test_policy(provider_id);
    // Availability every Monday, all working day
    let rules = MockAvailabilityRepository::new(policy)
        .with_rule(test_rule(provider_id, 0, "09:00", "17:00"));

    // Existing appointment Monday 10:00 EST (15:00 UTC)
    let appointment = appointment_at(provider_id, 15);
    let appointments =
        MockAppointmentRepository::new().with_appointment(appointment.clone());
    let tokens = MockTokenRepository::linked(appointments.clone());

    let service = RescheduleService::new(
        Arc::new(rules),
        Arc::new(appointments.clone()),
        Arc::new(tokens.clone()),
        Arc::new(RecordingNotifier::new()) as Arc<dyn NotificationDispatcher>,
        SchedulingConfig::default(),
    );
    Fixture { provider_id, appointment, service, appointments, tokens }
}

fn fixture() -> (Fixture, RescheduleToken) {
    let fx = fixture_base();
    let token = token_for(fx.appointment.id, 29);
    let fx = Fixture { tokens: fx.tokens.clone().with_token(token.clone()), ..fx };
    (fx, token)
}

#[tokio::test]
async fn redeeming_moves_the_appointment_and_keeps_status() {
    let (fx, token) = fixture();

    let outcome = fx
        .service
        .redeem(&token.value, parse_date("2026-03-09"), parse_time("13:00"))
        .await
        .unwrap();

    assert_eq!(outcome.appointment_id, fx.appointment.id);
    // 13:00 EDT on the 9th == 17:00 UTC
    assert_eq!(outcome.new_start, Utc.with_ymd_and_hms(2026, 3, 9, 17, 0, 0).unwrap());

    let stored = fx.appointments.get(fx.appointment.id).unwrap();
    assert_eq!(stored.start, outcome.new_start);
    assert_eq!((stored.end - stored.start).num_minutes(), 60);
    // Time change is not a status transition
    assert_eq!(stored.status, WorkflowStatus::Scheduled);
    assert!(fx.tokens.get(&token.value).unwrap().redeemed_at.is_some());
}

#[tokio::test]
async fn second_redemption_fails_already_used() {
    let (fx, token) = fixture();

    fx.service.redeem(&token.value, parse_date("2026-03-09"), parse_time("13:00")).await.unwrap();
    let err = fx
        .service
        .redeem(&token.value, parse_date("2026-03-09"), parse_time("15:00"))
        .await
        .unwrap_err();
    assert_eq!(err, PraxisError::TokenAlreadyUsed);
}

#[tokio::test]
async fn expired_token_is_rejected_even_if_never_used() {
    let fx = fixture_base();
    let mut token = token_for(fx.appointment.id, 0);
    token.expires_at = Utc::now() - Duration::days(1);
    let fx = Fixture { tokens: fx.tokens.clone().with_token(token.clone()), ..fx };

    let err = fx
        .service
        .redeem(&token.value, parse_date("2026-03-09"), parse_time("13:00"))
        .await
        .unwrap_err();
    assert_eq!(err, PraxisError::TokenExpired);
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let (fx, _token) = fixture();
    let err = fx
        .service
        .redeem("deadbeef", parse_date("2026-03-09"), parse_time("13:00"))
        .await
        .unwrap_err();
    assert_eq!(err, PraxisError::TokenNotFound);
}

#[tokio::test]
async fn rejected_proposal_does_not_consume_the_token() {
    let (fx, token) = fixture();

    // Tuesday has no availability rule
    let err = fx
        .service
        .redeem(&token.value, parse_date("2026-03-03"), parse_time("10:00"))
        .await
        .unwrap_err();
    assert_eq!(err, PraxisError::OutsideAvailability);
    assert!(fx.tokens.get(&token.value).unwrap().redeemed_at.is_none());

    // The same token still authorizes a valid proposal afterwards
    fx.service.redeem(&token.value, parse_date("2026-03-09"), parse_time("13:00")).await.unwrap();
}

#[tokio::test]
async fn redeeming_into_an_occupied_slot_fails_slot_taken() {
    let (fx, token) = fixture();

    // Another committed appointment Monday the 9th, 13:00-14:00 EDT
    let other = Appointment {
        start: Utc.with_ymd_and_hms(2026, 3, 9, 17, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 9, 18, 0, 0).unwrap(),
        ..appointment_at(fx.provider_id, 15)
    };
    fx.appointments.insert_appointment(&other).await.unwrap();

    let err = fx
        .service
        .redeem(&token.value, parse_date("2026-03-09"), parse_time("13:30"))
        .await
        .unwrap_err();
    assert_eq!(err, PraxisError::SlotTaken);
}

#[tokio::test]
async fn losing_the_slot_race_at_commit_leaves_the_token_unredeemed() {
    let (fx, token) = fixture();

    // A competitor commits Monday the 9th 13:00-14:00 EDT before the
    // redemption's own write lands.
    let other = Appointment {
        start: Utc.with_ymd_and_hms(2026, 3, 9, 17, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 9, 18, 0, 0).unwrap(),
        ..appointment_at(fx.provider_id, 15)
    };
    fx.appointments.insert_appointment(&other).await.unwrap();

    // The commit-time re-check rejects the slot
    let err = fx
        .tokens
        .redeem_and_move(
            &token.value,
            Utc::now(),
            Utc.with_ymd_and_hms(2026, 3, 9, 17, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 9, 18, 0, 0).unwrap(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, PraxisError::SlotTaken);

    // Neither write landed: token usable, appointment unmoved
    assert!(fx.tokens.get(&token.value).unwrap().redeemed_at.is_none());
    let stored = fx.appointments.get(fx.appointment.id).unwrap();
    assert_eq!(stored.start, fx.appointment.start);

    // The same token then moves the appointment to a clear slot
    fx.service.redeem(&token.value, parse_date("2026-03-09"), parse_time("14:30")).await.unwrap();
    assert!(fx.tokens.get(&token.value).unwrap().redeemed_at.is_some());
}

#[tokio::test]
async fn moving_within_own_interval_ignores_self_conflict() {
    let (fx, token) = fixture();

    // New slot 10:30 Monday the 2nd overlaps the appointment's current
    // 10:00-11:00 interval; the appointment being moved must not conflict
    // with itself.
    let outcome = fx
        .service
        .redeem(&token.value, parse_date(MONDAY), parse_time("10:30"))
        .await
        .unwrap();
    assert_eq!(outcome.new_start, Utc.with_ymd_and_hms(2026, 3, 2, 15, 30, 0).unwrap());
}

#[tokio::test]
async fn issue_binds_a_fresh_token_to_the_appointment() {
    let (fx, _token) = fixture();

    let issued = fx.service.issue(fx.appointment.id).await.unwrap();
    assert_eq!(issued.appointment_id, fx.appointment.id);
    assert_eq!((issued.expires_at - issued.issued_at).num_days(), 30);
    assert!(fx.tokens.get(&issued.value).is_some());

    let err = fx.service.issue(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PraxisError::NotFound(_)));
}

#[tokio::test]
async fn exactly_one_of_n_concurrent_redemptions_succeeds() {
    let (fx, token) = fixture();
    let service = Arc::new(fx.service);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        let value = token.value.clone();
        handles.push(tokio::spawn(async move {
            service.redeem(&value, parse_date("2026-03-09"), parse_time("13:00")).await
        }));
    }

    let mut successes = 0;
    let mut already_used = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(PraxisError::TokenAlreadyUsed) => already_used += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(already_used, 7);
}
