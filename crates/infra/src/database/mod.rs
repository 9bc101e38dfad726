//! SQLite-backed implementations of the core repository ports.
//!
//! A single serialized connection guards every write: the overlap re-check
//! and the insert that depends on it always execute inside one critical
//! section, which is what upholds the exclusion contract the core relies on.

pub mod appointment_repository;
pub mod availability_repository;
pub(crate) mod codec;
pub mod manager;
pub mod token_repository;

pub use appointment_repository::SqliteAppointmentRepository;
pub use availability_repository::SqliteAvailabilityRepository;
pub use manager::DatabaseManager;
pub use token_repository::SqliteTokenRepository;
