//! SQLite implementation of the AppointmentRepository port.
//!
//! The exclusion contract: every write that could violate the non-overlap
//! invariant re-checks it inside the serialized critical section, so a
//! concurrent booking that lost the race observes `SlotTaken` rather than a
//! corrupted calendar.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use praxis_core::scheduling::ports::AppointmentRepository;
use praxis_domain::{
    Appointment, Interval, PraxisError, Result, TransitionStamps, WorkflowStatus,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::instrument;
use uuid::Uuid;

use super::codec;
use super::manager::DatabaseManager;
use crate::errors::sql_err;

/// SQLite appointment store.
pub struct SqliteAppointmentRepository {
    db: Arc<DatabaseManager>,
}

impl SqliteAppointmentRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

type AppointmentColumns = (
    String,
    String,
    i64,
    i64,
    String,
    Option<String>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<String>,
    i64,
);

const APPOINTMENT_COLUMNS: &str = "id, provider_id, start_ts, end_ts, status, calendar_ref,
     accepted_at, sent_at, claimed_at, completed_at, cancelled_at, follow_up_due_on, created_at";

fn columns_from_row(row: &Row<'_>) -> rusqlite::Result<AppointmentColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
    ))
}

fn appointment_from_columns(cols: AppointmentColumns) -> Result<Appointment> {
    let (
        id,
        provider_id,
        start_ts,
        end_ts,
        status,
        calendar_ref,
        accepted_at,
        sent_at,
        claimed_at,
        completed_at,
        cancelled_at,
        follow_up_due_on,
        created_at,
    ) = cols;
    Ok(Appointment {
        id: codec::parse_uuid(&id)?,
        provider_id: codec::parse_uuid(&provider_id)?,
        start: codec::ts_to_datetime(start_ts)?,
        end: codec::ts_to_datetime(end_ts)?,
        status: codec::parse_status(&status)?,
        calendar_ref,
        accepted_at: codec::opt_ts_to_datetime(accepted_at)?,
        sent_at: codec::opt_ts_to_datetime(sent_at)?,
        claimed_at: codec::opt_ts_to_datetime(claimed_at)?,
        completed_at: codec::opt_ts_to_datetime(completed_at)?,
        cancelled_at: codec::opt_ts_to_datetime(cancelled_at)?,
        follow_up_due_on: follow_up_due_on.as_deref().map(codec::parse_date).transpose()?,
        created_at: codec::ts_to_datetime(created_at)?,
    })
}

/// Half-open overlap probe against committed (non-cancelled) appointments.
/// Must run inside the same critical section as the write that depends on it.
pub(crate) fn overlap_exists(
    conn: &Connection,
    provider_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM appointments
             WHERE provider_id = ?1
               AND status != 'cancelled'
               AND start_ts < ?3 AND end_ts > ?2
               AND (?4 IS NULL OR id != ?4)",
            params![
                provider_id.to_string(),
                start.timestamp(),
                end.timestamp(),
                exclude.map(|id| id.to_string()),
            ],
            |row| row.get(0),
        )
        .map_err(sql_err)?;
    Ok(count > 0)
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepository {
    #[instrument(skip(self))]
    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
        let conn = self.db.connection();
        let cols = conn
            .query_row(
                &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
                params![id.to_string()],
                columns_from_row,
            )
            .optional()
            .map_err(sql_err)?;
        cols.map(appointment_from_columns).transpose()
    }

    #[instrument(skip(self))]
    async fn appointments_in_range(
        &self,
        provider_id: Uuid,
        range: Interval,
    ) -> Result<Vec<Appointment>> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 WHERE provider_id = ?1 AND start_ts >= ?2 AND start_ts < ?3
                 ORDER BY start_ts"
            ))
            .map_err(sql_err)?;

        let raw = stmt
            .query_map(
                params![
                    provider_id.to_string(),
                    range.start.timestamp(),
                    range.end.timestamp()
                ],
                columns_from_row,
            )
            .map_err(sql_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(sql_err)?;

        raw.into_iter().map(appointment_from_columns).collect()
    }

    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn insert_appointment(&self, appointment: &Appointment) -> Result<()> {
        let conn = self.db.connection();
        if overlap_exists(
            &conn,
            appointment.provider_id,
            appointment.start,
            appointment.end,
            None,
        )? {
            return Err(PraxisError::SlotTaken);
        }
        conn.execute(
            &format!(
                "INSERT INTO appointments ({APPOINTMENT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            ),
            params![
                appointment.id.to_string(),
                appointment.provider_id.to_string(),
                appointment.start.timestamp(),
                appointment.end.timestamp(),
                appointment.status.to_string(),
                appointment.calendar_ref,
                appointment.accepted_at.map(|t| t.timestamp()),
                appointment.sent_at.map(|t| t.timestamp()),
                appointment.claimed_at.map(|t| t.timestamp()),
                appointment.completed_at.map(|t| t.timestamp()),
                appointment.cancelled_at.map(|t| t.timestamp()),
                appointment.follow_up_due_on.map(codec::date_to_text),
                appointment.created_at.timestamp(),
            ],
        )
        .map_err(sql_err)?;
        Ok(())
    }

    #[instrument(skip(self, stamps))]
    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: WorkflowStatus,
        stamps: &TransitionStamps,
    ) -> Result<()> {
        let changed = self
            .db
            .connection()
            .execute(
                "UPDATE appointments SET
                     status = ?2,
                     accepted_at = COALESCE(?3, accepted_at),
                     sent_at = COALESCE(?4, sent_at),
                     claimed_at = COALESCE(?5, claimed_at),
                     completed_at = COALESCE(?6, completed_at),
                     cancelled_at = COALESCE(?7, cancelled_at),
                     follow_up_due_on = COALESCE(?8, follow_up_due_on)
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    status.to_string(),
                    stamps.accepted_at.map(|t| t.timestamp()),
                    stamps.sent_at.map(|t| t.timestamp()),
                    stamps.claimed_at.map(|t| t.timestamp()),
                    stamps.completed_at.map(|t| t.timestamp()),
                    stamps.cancelled_at.map(|t| t.timestamp()),
                    stamps.follow_up_due_on.map(codec::date_to_text),
                ],
            )
            .map_err(sql_err)?;
        if changed == 0 {
            return Err(PraxisError::NotFound(format!("appointment {id}")));
        }
        Ok(())
    }
}
