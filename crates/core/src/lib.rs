//! # Praxis Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The scheduling engine (civil time, availability, conflicts, booking,
//!   reschedule tokens)
//! - The review workflow state machine
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `praxis-domain`
//! - No database, HTTP, or delivery code
//! - All external collaborators via traits
//! - Pure, testable business logic

pub mod scheduling;
pub mod workflow;

// Re-export specific items to avoid ambiguity
pub use scheduling::availability::AvailabilityService;
pub use scheduling::booking::BookingService;
pub use scheduling::conflict::ConflictService;
pub use scheduling::ports::{
    AppointmentRepository, AvailabilityRepository, NotificationDispatcher, TokenRepository,
};
pub use scheduling::reschedule::RescheduleService;
pub use workflow::transitions::{allowed_transitions, can_transition};
pub use workflow::WorkflowService;
