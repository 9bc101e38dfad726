//! Database connection management and schema migrations.

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use praxis_domain::Result;
use rusqlite::Connection;
use tracing::info;

use crate::errors::sql_err;

/// Owns the serialized SQLite connection shared by the repositories.
///
/// SQLite serializes writers anyway; the mutex additionally serializes the
/// read-check-then-write sequences the repositories perform, so those
/// sequences are atomic with respect to each other.
pub struct DatabaseManager {
    conn: Mutex<Connection>,
}

impl DatabaseManager {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        let conn = Connection::open(path.as_ref()).map_err(sql_err)?;
        let manager = Self { conn: Mutex::new(conn) };
        manager.apply_schema()?;
        info!(path = %path.as_ref().display(), "database opened");
        Ok(Arc::new(manager))
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Arc<Self>> {
        let conn = Connection::open_in_memory().map_err(sql_err)?;
        let manager = Self { conn: Mutex::new(conn) };
        manager.apply_schema()?;
        Ok(Arc::new(manager))
    }

    pub(crate) fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    fn apply_schema(&self) -> Result<()> {
        self.connection()
            .execute_batch(
                "PRAGMA foreign_keys = ON;

                 CREATE TABLE IF NOT EXISTS booking_policies (
                     provider_id              TEXT PRIMARY KEY,
                     timezone                 TEXT NOT NULL,
                     default_duration_minutes INTEGER NOT NULL,
                     buffer_before_minutes    INTEGER NOT NULL,
                     buffer_after_minutes     INTEGER NOT NULL,
                     allow_public_booking     INTEGER NOT NULL,
                     require_approval         INTEGER NOT NULL,
                     token_validity_days      INTEGER
                 );

                 CREATE TABLE IF NOT EXISTS availability_rules (
                     id          TEXT PRIMARY KEY,
                     provider_id TEXT NOT NULL,
                     day_of_week INTEGER NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
                     start_time  TEXT NOT NULL,
                     end_time    TEXT NOT NULL,
                     enabled     INTEGER NOT NULL DEFAULT 1
                 );
                 CREATE INDEX IF NOT EXISTS idx_rules_provider_day
                     ON availability_rules(provider_id, day_of_week);

                 CREATE TABLE IF NOT EXISTS appointments (
                     id               TEXT PRIMARY KEY,
                     provider_id      TEXT NOT NULL,
                     start_ts         INTEGER NOT NULL,
                     end_ts           INTEGER NOT NULL,
                     status           TEXT NOT NULL,
                     calendar_ref     TEXT,
                     accepted_at      INTEGER,
                     sent_at          INTEGER,
                     claimed_at       INTEGER,
                     completed_at     INTEGER,
                     cancelled_at     INTEGER,
                     follow_up_due_on TEXT,
                     created_at       INTEGER NOT NULL
                 );
                 CREATE INDEX IF NOT EXISTS idx_appointments_provider_start
                     ON appointments(provider_id, start_ts);

                 CREATE TABLE IF NOT EXISTS reschedule_tokens (
                     value          TEXT PRIMARY KEY,
                     appointment_id TEXT NOT NULL REFERENCES appointments(id),
                     issued_at      INTEGER NOT NULL,
                     expires_at     INTEGER NOT NULL,
                     redeemed_at    INTEGER
                 );",
            )
            .map_err(sql_err)
    }
}
