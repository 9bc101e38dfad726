//! Column encoding helpers shared by the repositories.
//!
//! Instants are stored as unix seconds, civil times as `HH:MM:SS` text,
//! civil dates as `YYYY-MM-DD` text, statuses as their canonical lowercase
//! names, and uuids as hyphenated text.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use praxis_domain::{PraxisError, Result, WorkflowStatus};
use uuid::Uuid;

pub(crate) fn parse_uuid(text: &str) -> Result<Uuid> {
    Uuid::parse_str(text)
        .map_err(|e| PraxisError::Database(format!("invalid uuid column: {e}")))
}

pub(crate) fn time_to_text(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

pub(crate) fn parse_time(text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .map_err(|e| PraxisError::Database(format!("invalid time column: {e}")))
}

pub(crate) fn date_to_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| PraxisError::Database(format!("invalid date column: {e}")))
}

pub(crate) fn ts_to_datetime(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| PraxisError::Database(format!("timestamp out of range: {ts}")))
}

pub(crate) fn opt_ts_to_datetime(ts: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    ts.map(ts_to_datetime).transpose()
}

pub(crate) fn parse_status(text: &str) -> Result<WorkflowStatus> {
    WorkflowStatus::from_str(text).map_err(PraxisError::Database)
}
