//! Review workflow state machine
//!
//! A fixed transition table governs which lifecycle status changes are legal
//! on a review appointment, and entering certain statuses mandates timestamp
//! writes. The table in [`transitions`] is the single source of truth.

pub mod service;
pub mod transitions;

pub use service::WorkflowService;
