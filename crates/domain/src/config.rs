//! Configuration structures
//!
//! Global configuration for the scheduling core. Per-provider knobs live on
//! `BookingPolicy`; everything here is deployment-wide.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FOLLOW_UP_MONTHS, DEFAULT_POLICY_CACHE_CAPACITY, DEFAULT_POLICY_CACHE_TTL_SECS,
    DEFAULT_TOKEN_VALIDITY_DAYS,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

/// Database configuration (consumed by the infra layer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Deployment-wide scheduling defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Reschedule-token validity when the provider policy does not override it.
    #[serde(default = "default_token_validity_days")]
    pub token_validity_days: u32,
    /// Calendar months between claiming a review and its follow-up due date.
    #[serde(default = "default_follow_up_months")]
    pub follow_up_months: u32,
    /// TTL for the read-mostly policy/rule cache.
    #[serde(default = "default_policy_cache_ttl_secs")]
    pub policy_cache_ttl_secs: u64,
    /// Maximum entries held by the policy cache.
    #[serde(default = "default_policy_cache_capacity")]
    pub policy_cache_capacity: u64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            token_validity_days: DEFAULT_TOKEN_VALIDITY_DAYS,
            follow_up_months: DEFAULT_FOLLOW_UP_MONTHS,
            policy_cache_ttl_secs: DEFAULT_POLICY_CACHE_TTL_SECS,
            policy_cache_capacity: DEFAULT_POLICY_CACHE_CAPACITY,
        }
    }
}

fn default_token_validity_days() -> u32 {
    DEFAULT_TOKEN_VALIDITY_DAYS
}

fn default_follow_up_months() -> u32 {
    DEFAULT_FOLLOW_UP_MONTHS
}

fn default_policy_cache_ttl_secs() -> u64 {
    DEFAULT_POLICY_CACHE_TTL_SECS
}

fn default_policy_cache_capacity() -> u64 {
    DEFAULT_POLICY_CACHE_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduling_defaults() {
        let cfg = SchedulingConfig::default();
        assert_eq!(cfg.token_validity_days, 30);
        assert_eq!(cfg.follow_up_months, 6);
    }

    #[test]
    fn missing_scheduling_section_falls_back_to_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{"database": {"path": "praxis.db"}}"#).unwrap();
        assert_eq!(cfg.scheduling.token_validity_days, 30);
        assert_eq!(cfg.database.path, "praxis.db");
    }
}
