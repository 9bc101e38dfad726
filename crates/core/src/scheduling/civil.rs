//! Civil time conversion
//!
//! Converts between a (date, time-of-day, named-timezone) triple and an
//! absolute instant, and performs the interval arithmetic the scheduling
//! engine needs. All daylight-saving awareness lives here; the rest of the
//! engine works on absolute instants only.
//!
//! Disambiguation contract:
//! - A wall-clock time repeated by a fall-back transition resolves to the
//!   earlier occurrence.
//! - A wall-clock time skipped by a spring-forward transition is rejected
//!   with `MalformedInput`.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use praxis_domain::{Interval, PraxisError, Result};

/// Parse an IANA zone identifier.
pub fn parse_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| PraxisError::MalformedInput(format!("unrecognized timezone: {name}")))
}

/// Interpret a wall-clock date + time in the named civil timezone and return
/// the corresponding absolute instant.
pub fn local_to_absolute(date: NaiveDate, time: NaiveTime, zone: Tz) -> Result<DateTime<Utc>> {
    let naive = date.and_time(time);
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Fall-back repeated hour: deterministically pick the earlier occurrence
        LocalResult::Ambiguous(earlier, _later) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => Err(PraxisError::MalformedInput(format!(
            "wall-clock time {naive} does not exist in {zone} (spring-forward gap)"
        ))),
    }
}

/// Pure absolute-time arithmetic; does not reinterpret civil time.
pub fn add_minutes(instant: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    instant + Duration::minutes(minutes)
}

/// Absolute bounds `[start, end)` of a civil date in the given zone.
///
/// A civil day is not always 24 hours: it is 23 on a spring-forward date and
/// 25 on a fall-back date. Callers that scope queries to "this civil day"
/// must use these bounds rather than `start + 24h`.
pub fn day_bounds(date: NaiveDate, zone: Tz) -> Result<Interval> {
    let next = date.succ_opt().ok_or_else(|| {
        PraxisError::MalformedInput(format!("date out of supported range: {date}"))
    })?;
    Ok(Interval::new(first_instant_of(date, zone)?, first_instant_of(next, zone)?))
}

/// Absolute instant at which a civil date begins.
///
/// Midnight itself can fall inside a spring-forward gap (e.g. the
/// America/Sao_Paulo rules before 2019), in which case the day begins at the
/// first wall-clock minute that exists.
fn first_instant_of(date: NaiveDate, zone: Tz) -> Result<DateTime<Utc>> {
    let mut time = NaiveTime::MIN;
    for _ in 0..8 {
        match zone.from_local_datetime(&date.and_time(time)) {
            LocalResult::Single(dt) => return Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earlier, _) => return Ok(earlier.with_timezone(&Utc)),
            LocalResult::None => {
                time = time.overflowing_add_signed(Duration::minutes(15)).0;
            }
        }
    }
    Err(PraxisError::MalformedInput(format!(
        "could not resolve start of civil day {date} in {zone}"
    )))
}
