//! SQLite implementation of the TokenRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use praxis_core::scheduling::ports::TokenRepository;
use praxis_domain::{PraxisError, RescheduleToken, Result};
use rusqlite::{params, OptionalExtension};
use tracing::instrument;

use super::appointment_repository::overlap_exists;
use super::codec;
use super::manager::DatabaseManager;
use crate::errors::sql_err;

/// SQLite reschedule-token store. Redeemed tokens are never deleted; the
/// redemption timestamp is the audit trail.
pub struct SqliteTokenRepository {
    db: Arc<DatabaseManager>,
}

impl SqliteTokenRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    #[instrument(skip(self, token), fields(appointment_id = %token.appointment_id))]
    async fn insert_token(&self, token: &RescheduleToken) -> Result<()> {
        self.db
            .connection()
            .execute(
                "INSERT INTO reschedule_tokens
                     (value, appointment_id, issued_at, expires_at, redeemed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    token.value,
                    token.appointment_id.to_string(),
                    token.issued_at.timestamp(),
                    token.expires_at.timestamp(),
                    token.redeemed_at.map(|t| t.timestamp()),
                ],
            )
            .map_err(sql_err)?;
        Ok(())
    }

    #[instrument(skip(self, value))]
    async fn find_token(&self, value: &str) -> Result<Option<RescheduleToken>> {
        let conn = self.db.connection();
        let row = conn
            .query_row(
                "SELECT value, appointment_id, issued_at, expires_at, redeemed_at
                 FROM reschedule_tokens WHERE value = ?1",
                params![value],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(sql_err)?;

        row.map(|(token_value, appointment_id, issued_at, expires_at, redeemed_at)| {
            Ok(RescheduleToken {
                value: token_value,
                appointment_id: codec::parse_uuid(&appointment_id)?,
                issued_at: codec::ts_to_datetime(issued_at)?,
                expires_at: codec::ts_to_datetime(expires_at)?,
                redeemed_at: codec::opt_ts_to_datetime(redeemed_at)?,
            })
        })
        .transpose()
    }

    #[instrument(skip(self, value))]
    async fn redeem_and_move(
        &self,
        value: &str,
        redeemed_at: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = self.db.connection();
        let tx = conn.transaction().map_err(sql_err)?;

        let row: Option<(String, Option<i64>)> = tx
            .query_row(
                "SELECT appointment_id, redeemed_at FROM reschedule_tokens WHERE value = ?1",
                params![value],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(sql_err)?;
        let (appointment_id, redeemed) = row.ok_or(PraxisError::TokenNotFound)?;
        if redeemed.is_some() {
            return Err(PraxisError::TokenAlreadyUsed);
        }
        let appointment_id = codec::parse_uuid(&appointment_id)?;

        let provider: Option<String> = tx
            .query_row(
                "SELECT provider_id FROM appointments WHERE id = ?1",
                params![appointment_id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(sql_err)?;
        let provider_id = codec::parse_uuid(&provider.ok_or_else(|| {
            PraxisError::NotFound(format!("appointment {appointment_id}"))
        })?)?;

        // Both the exclusion re-check and the two writes sit inside one
        // transaction: losing the slot race leaves the token unredeemed.
        if overlap_exists(&tx, provider_id, start, end, Some(appointment_id))? {
            return Err(PraxisError::SlotTaken);
        }

        let changed = tx
            .execute(
                "UPDATE reschedule_tokens SET redeemed_at = ?2
                 WHERE value = ?1 AND redeemed_at IS NULL",
                params![value, redeemed_at.timestamp()],
            )
            .map_err(sql_err)?;
        if changed != 1 {
            return Err(PraxisError::TokenAlreadyUsed);
        }
        tx.execute(
            "UPDATE appointments SET start_ts = ?2, end_ts = ?3 WHERE id = ?1",
            params![
                appointment_id.to_string(),
                start.timestamp(),
                end.timestamp()
            ],
        )
        .map_err(sql_err)?;

        tx.commit().map_err(sql_err)
    }
}
