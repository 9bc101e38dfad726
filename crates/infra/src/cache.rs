//! Read-through caching for availability lookups.
//!
//! Policies and recurring rules change rarely but are read on every booking
//! attempt, so a short-TTL cache in front of the repository absorbs the
//! hot-path reads. Writes go through [`CachedAvailabilityRepository`]'s own
//! mutation helpers, which invalidate the affected entries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use praxis_core::scheduling::ports::AvailabilityRepository;
use praxis_domain::config::SchedulingConfig;
use praxis_domain::{AvailabilityRule, BookingPolicy, Result};
use tracing::debug;
use uuid::Uuid;

use crate::database::SqliteAvailabilityRepository;

/// Caching decorator over [`SqliteAvailabilityRepository`].
pub struct CachedAvailabilityRepository {
    inner: Arc<SqliteAvailabilityRepository>,
    policies: Cache<Uuid, BookingPolicy>,
    rules: Cache<(Uuid, u8), Vec<AvailabilityRule>>,
}

impl CachedAvailabilityRepository {
    pub fn new(inner: Arc<SqliteAvailabilityRepository>, config: &SchedulingConfig) -> Self {
        let ttl = Duration::from_secs(config.policy_cache_ttl_secs);
        Self {
            inner,
            policies: Cache::builder()
                .max_capacity(config.policy_cache_capacity)
                .time_to_live(ttl)
                .build(),
            rules: Cache::builder()
                .max_capacity(config.policy_cache_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Write a policy through to storage and drop the stale cache entry.
    pub fn upsert_policy(&self, policy: &BookingPolicy) -> Result<()> {
        self.inner.upsert_policy(policy)?;
        self.policies.invalidate(&policy.provider_id);
        Ok(())
    }

    /// Write a rule through to storage and drop the affected day's entry.
    pub fn insert_rule(&self, rule: &AvailabilityRule) -> Result<()> {
        self.inner.insert_rule(rule)?;
        self.rules.invalidate(&(rule.provider_id, rule.day_of_week));
        Ok(())
    }

    /// Toggle a rule. Rule day is not known from the id alone, so every
    /// cached day for every provider is dropped.
    pub fn set_rule_enabled(&self, rule_id: Uuid, enabled: bool) -> Result<()> {
        self.inner.set_rule_enabled(rule_id, enabled)?;
        self.rules.invalidate_all();
        Ok(())
    }
}

#[async_trait]
impl AvailabilityRepository for CachedAvailabilityRepository {
    async fn rules_for_day(
        &self,
        provider_id: Uuid,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityRule>> {
        let key = (provider_id, day_of_week);
        if let Some(hit) = self.rules.get(&key) {
            return Ok(hit);
        }
        let rules = self.inner.rules_for_day(provider_id, day_of_week).await?;
        debug!(%provider_id, day_of_week, count = rules.len(), "rules cache miss");
        self.rules.insert(key, rules.clone());
        Ok(rules)
    }

    async fn booking_policy(&self, provider_id: Uuid) -> Result<BookingPolicy> {
        if let Some(hit) = self.policies.get(&provider_id) {
            return Ok(hit);
        }
        // Errors, including unknown providers, are never cached.
        let policy = self.inner.booking_policy(provider_id).await?;
        debug!(%provider_id, "policy cache miss");
        self.policies.insert(provider_id, policy.clone());
        Ok(policy)
    }
}
