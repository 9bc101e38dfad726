//! SQLite implementation of the AvailabilityRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use praxis_core::scheduling::ports::AvailabilityRepository;
use praxis_domain::constants::DAYS_PER_WEEK;
use praxis_domain::{AvailabilityRule, BookingPolicy, PraxisError, Result};
use rusqlite::{params, OptionalExtension, Row};
use tracing::instrument;
use uuid::Uuid;

use super::codec;
use super::manager::DatabaseManager;
use crate::errors::sql_err;

/// SQLite availability-rule and booking-policy store.
pub struct SqliteAvailabilityRepository {
    db: Arc<DatabaseManager>,
}

impl SqliteAvailabilityRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Create or replace a provider's booking policy.
    pub fn upsert_policy(&self, policy: &BookingPolicy) -> Result<()> {
        self.db
            .connection()
            .execute(
                "INSERT INTO booking_policies (
                     provider_id, timezone, default_duration_minutes,
                     buffer_before_minutes, buffer_after_minutes,
                     allow_public_booking, require_approval, token_validity_days
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(provider_id) DO UPDATE SET
                     timezone = excluded.timezone,
                     default_duration_minutes = excluded.default_duration_minutes,
                     buffer_before_minutes = excluded.buffer_before_minutes,
                     buffer_after_minutes = excluded.buffer_after_minutes,
                     allow_public_booking = excluded.allow_public_booking,
                     require_approval = excluded.require_approval,
                     token_validity_days = excluded.token_validity_days",
                params![
                    policy.provider_id.to_string(),
                    policy.timezone,
                    policy.default_duration_minutes,
                    policy.buffer_before_minutes,
                    policy.buffer_after_minutes,
                    policy.allow_public_booking,
                    policy.require_approval,
                    policy.token_validity_days,
                ],
            )
            .map_err(sql_err)?;
        Ok(())
    }

    /// Persist one weekly rule.
    pub fn insert_rule(&self, rule: &AvailabilityRule) -> Result<()> {
        if rule.day_of_week >= DAYS_PER_WEEK {
            return Err(PraxisError::MalformedInput(format!(
                "day_of_week {} out of range (0 = Monday .. 6 = Sunday)",
                rule.day_of_week
            )));
        }
        self.db
            .connection()
            .execute(
                "INSERT INTO availability_rules
                     (id, provider_id, day_of_week, start_time, end_time, enabled)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    rule.id.to_string(),
                    rule.provider_id.to_string(),
                    rule.day_of_week,
                    codec::time_to_text(rule.start_time),
                    codec::time_to_text(rule.end_time),
                    rule.enabled,
                ],
            )
            .map_err(sql_err)?;
        Ok(())
    }

    /// Enable or disable an existing rule.
    pub fn set_rule_enabled(&self, rule_id: Uuid, enabled: bool) -> Result<()> {
        let changed = self
            .db
            .connection()
            .execute(
                "UPDATE availability_rules SET enabled = ?2 WHERE id = ?1",
                params![rule_id.to_string(), enabled],
            )
            .map_err(sql_err)?;
        if changed == 0 {
            return Err(PraxisError::NotFound(format!("availability rule {rule_id}")));
        }
        Ok(())
    }
}

fn rule_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, u8, String, String, bool)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

#[async_trait]
impl AvailabilityRepository for SqliteAvailabilityRepository {
    #[instrument(skip(self))]
    async fn rules_for_day(
        &self,
        provider_id: Uuid,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityRule>> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(
                "SELECT id, provider_id, day_of_week, start_time, end_time, enabled
                 FROM availability_rules
                 WHERE provider_id = ?1 AND day_of_week = ?2
                 ORDER BY start_time",
            )
            .map_err(sql_err)?;

        let raw = stmt
            .query_map(params![provider_id.to_string(), day_of_week], rule_from_row)
            .map_err(sql_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(sql_err)?;

        raw.into_iter()
            .map(|(id, provider, day, start, end, enabled)| {
                Ok(AvailabilityRule {
                    id: codec::parse_uuid(&id)?,
                    provider_id: codec::parse_uuid(&provider)?,
                    day_of_week: day,
                    start_time: codec::parse_time(&start)?,
                    end_time: codec::parse_time(&end)?,
                    enabled,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn booking_policy(&self, provider_id: Uuid) -> Result<BookingPolicy> {
        let conn = self.db.connection();
        let row = conn
            .query_row(
                "SELECT provider_id, timezone, default_duration_minutes,
                        buffer_before_minutes, buffer_after_minutes,
                        allow_public_booking, require_approval, token_validity_days
                 FROM booking_policies WHERE provider_id = ?1",
                params![provider_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, u32>(4)?,
                        row.get::<_, bool>(5)?,
                        row.get::<_, bool>(6)?,
                        row.get::<_, Option<u32>>(7)?,
                    ))
                },
            )
            .optional()
            .map_err(sql_err)?;

        let (provider, timezone, duration, before, after, public, approval, validity) =
            row.ok_or_else(|| PraxisError::NotFound(format!("provider {provider_id}")))?;

        Ok(BookingPolicy {
            provider_id: codec::parse_uuid(&provider)?,
            timezone,
            default_duration_minutes: duration,
            buffer_before_minutes: before,
            buffer_after_minutes: after,
            allow_public_booking: public,
            require_approval: approval,
            token_validity_days: validity,
        })
    }
}
