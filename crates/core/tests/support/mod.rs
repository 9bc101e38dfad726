//! Shared test support for core integration tests

pub mod repositories;

use chrono::{NaiveDate, NaiveTime};
use praxis_domain::{AvailabilityRule, BookingPolicy};
use uuid::Uuid;

/// A permissive default policy in the provider's civil zone.
pub fn test_policy(provider_id: Uuid) -> BookingPolicy {
    BookingPolicy {
        provider_id,
        timezone: "America/Toronto".into(),
        default_duration_minutes: 60,
        buffer_before_minutes: 15,
        buffer_after_minutes: 15,
        allow_public_booking: true,
        require_approval: false,
        token_validity_days: None,
    }
}

/// An enabled weekly rule (Monday = 0 contract).
pub fn test_rule(provider_id: Uuid, day_of_week: u8, start: &str, end: &str) -> AvailabilityRule {
    AvailabilityRule {
        id: Uuid::new_v4(),
        provider_id,
        day_of_week,
        start_time: parse_time(start),
        end_time: parse_time(end),
        enabled: true,
    }
}

pub fn parse_time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

pub fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}
