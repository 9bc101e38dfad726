//! # Praxis Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite-backed repositories for appointments, availability, and tokens
//! - The TTL'd read-through cache for booking policies
//! - The tracing-based notification dispatcher
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `praxis-core`
//! - Depends on `praxis-domain` and `praxis-core`
//! - Contains all "impure" code (I/O, persistence)

pub mod cache;
pub mod config;
pub mod database;
pub mod errors;
pub mod notify;

// Re-export commonly used items
pub use cache::CachedAvailabilityRepository;
pub use database::{
    DatabaseManager, SqliteAppointmentRepository, SqliteAvailabilityRepository,
    SqliteTokenRepository,
};
pub use errors::InfraError;
pub use notify::LoggingNotifier;
