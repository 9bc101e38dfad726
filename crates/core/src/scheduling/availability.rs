//! Availability resolution
//!
//! Maps a provider's recurring weekly rules onto a concrete civil date and
//! answers whether a candidate interval is offered at all.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use praxis_domain::{Interval, Result};
use tracing::debug;
use uuid::Uuid;

use super::civil;
use super::ports::AvailabilityRepository;

/// Resolves recurring availability rules against concrete dates.
pub struct AvailabilityService {
    rules: Arc<dyn AvailabilityRepository>,
}

impl AvailabilityService {
    pub fn new(rules: Arc<dyn AvailabilityRepository>) -> Self {
        Self { rules }
    }

    /// Absolute intervals offered by the provider on `date`.
    ///
    /// Disabled rules are skipped. Rule times are interpreted on `date` in
    /// the provider's zone, so the result is daylight-saving correct. A rule
    /// whose wall time does not exist on `date` (spring-forward gap) is
    /// skipped rather than failing the whole day.
    pub async fn resolve_availability(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        zone: Tz,
    ) -> Result<Vec<Interval>> {
        let day = day_of_week(date);
        let rules = self.rules.rules_for_day(provider_id, day).await?;

        let mut intervals = Vec::with_capacity(rules.len());
        for rule in rules.iter().filter(|r| r.enabled) {
            let (start, end) = match (
                civil::local_to_absolute(date, rule.start_time, zone),
                civil::local_to_absolute(date, rule.end_time, zone),
            ) {
                (Ok(start), Ok(end)) => (start, end),
                (Err(_), _) | (_, Err(_)) => {
                    debug!(rule_id = %rule.id, "skipping availability rule stranded in a civil-time gap");
                    continue;
                }
            };
            if start < end {
                intervals.push(Interval::new(start, end));
            } else {
                debug!(rule_id = %rule.id, "skipping availability rule with inverted interval");
            }
        }
        Ok(intervals)
    }

    /// True iff `candidate` fits entirely inside a single enabled rule.
    ///
    /// No partial credit: an interval spanning two adjacent rules is not
    /// within availability even when the rules touch.
    pub async fn is_within_availability(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        candidate: Interval,
        zone: Tz,
    ) -> Result<bool> {
        let offered = self.resolve_availability(provider_id, date, zone).await?;
        Ok(offered.iter().any(|slot| slot.contains(&candidate)))
    }
}

/// The single place that remaps chrono's weekday onto the frozen
/// Monday = 0 storage contract.
fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}
