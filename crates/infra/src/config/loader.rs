//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variables are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PRAXIS_DB_PATH`: Database file path (required for env loading)
//! - `PRAXIS_TOKEN_VALIDITY_DAYS`: Default reschedule-token validity
//! - `PRAXIS_FOLLOW_UP_MONTHS`: Months from claim to follow-up due date
//! - `PRAXIS_CACHE_TTL_SECS`: Policy cache TTL in seconds
//! - `PRAXIS_CACHE_CAPACITY`: Policy cache entry limit
//!
//! The scheduling variables are optional and fall back to the
//! `SchedulingConfig` defaults when unset.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./praxis.json` or `./praxis.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use praxis_domain::{Config, DatabaseConfig, PraxisError, Result, SchedulingConfig};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If `PRAXIS_DB_PATH`
/// is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `PraxisError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `PRAXIS_DB_PATH` must be present; the scheduling knobs are optional.
///
/// # Errors
/// Returns `PraxisError::Config` if `PRAXIS_DB_PATH` is missing or any
/// present variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("PRAXIS_DB_PATH")?;

    let defaults = SchedulingConfig::default();
    let token_validity_days =
        env_parsed("PRAXIS_TOKEN_VALIDITY_DAYS", defaults.token_validity_days)?;
    let follow_up_months = env_parsed("PRAXIS_FOLLOW_UP_MONTHS", defaults.follow_up_months)?;
    let policy_cache_ttl_secs = env_parsed("PRAXIS_CACHE_TTL_SECS", defaults.policy_cache_ttl_secs)?;
    let policy_cache_capacity =
        env_parsed("PRAXIS_CACHE_CAPACITY", defaults.policy_cache_capacity)?;

    Ok(Config {
        database: DatabaseConfig { path: db_path },
        scheduling: SchedulingConfig {
            token_validity_days,
            follow_up_months,
            policy_cache_ttl_secs,
            policy_cache_capacity,
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `PraxisError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PraxisError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PraxisError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PraxisError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format detected by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PraxisError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PraxisError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PraxisError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe standard locations for a configuration file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("praxis.json"),
            cwd.join("praxis.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("praxis.json"),
                exe_dir.join("praxis.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `PraxisError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| PraxisError::Config(format!("Missing required environment variable: {}", key)))
}

/// Parse an optional numeric environment variable, falling back to `default`
/// when unset.
fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| PraxisError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
