//! Error types used throughout the scheduling core

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::WorkflowStatus;

/// Main error type for Praxis.
///
/// The business-rule variants (`OutsideAvailability`, `SlotTaken`) are
/// surfaced to the end user verbatim and are retryable with a different time.
/// The token variants are terminal for that token. `InvalidTransition`
/// indicates a caller bug and carries the allowed set for debuggability.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum PraxisError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Requested time is outside the provider's availability")]
    OutsideAvailability,

    #[error("Requested slot is already taken")]
    SlotTaken,

    #[error("Reschedule token not found")]
    TokenNotFound,

    #[error("Reschedule token has expired")]
    TokenExpired,

    #[error("Reschedule token has already been used")]
    TokenAlreadyUsed,

    #[error("Invalid transition from {from} to {to} (allowed: {allowed:?})")]
    InvalidTransition {
        from: WorkflowStatus,
        to: WorkflowStatus,
        allowed: Vec<WorkflowStatus>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

/// Result type alias for Praxis operations
pub type Result<T> = std::result::Result<T, PraxisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_the_allowed_set() {
        let err = PraxisError::InvalidTransition {
            from: WorkflowStatus::Pending,
            to: WorkflowStatus::Interview,
            allowed: vec![WorkflowStatus::Accepted, WorkflowStatus::Cancelled],
        };
        let msg = err.to_string();
        assert!(msg.contains("pending"));
        assert!(msg.contains("interview"));
        assert!(msg.contains("Accepted"));
    }

    #[test]
    fn errors_serialize_with_type_tag() {
        let json = serde_json::to_value(&PraxisError::SlotTaken).unwrap();
        assert_eq!(json["type"], "SlotTaken");

        let json = serde_json::to_value(&PraxisError::MalformedInput("bad zone".into())).unwrap();
        assert_eq!(json["type"], "MalformedInput");
        assert_eq!(json["detail"], "bad zone");
    }
}
