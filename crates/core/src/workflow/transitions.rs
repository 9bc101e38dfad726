//! The workflow transition table
//!
//! Single source of truth for status reachability. Nothing else in the
//! codebase may encode its own copy of these rules.

use praxis_domain::WorkflowStatus;

/// Statuses directly reachable from `from` in one transition.
///
/// `Completed` and `Cancelled` are terminal: their reachable set is empty.
pub fn allowed_transitions(from: WorkflowStatus) -> &'static [WorkflowStatus] {
    use WorkflowStatus::{
        Accepted, Cancelled, Claimed, Completed, DataEntry, FollowUpDue, Interview, Pending,
        ReportDraft, ReportReady, Scheduled, Sent,
    };

    match from {
        Pending => &[Accepted, Cancelled],
        Accepted => &[Scheduled, Cancelled],
        Scheduled => &[DataEntry, Cancelled],
        DataEntry => &[Interview, Cancelled],
        Interview => &[ReportDraft, Cancelled],
        ReportDraft => &[ReportReady, Cancelled],
        ReportReady => &[Sent, Cancelled],
        Sent => &[Claimed, Cancelled],
        Claimed => &[FollowUpDue, Completed, Cancelled],
        FollowUpDue => &[Completed, Cancelled],
        Completed => &[],
        Cancelled => &[],
    }
}

/// True if `from == to` (idempotent no-op transitions are always legal) or
/// `to` is in `from`'s reachable set.
pub fn can_transition(from: WorkflowStatus, to: WorkflowStatus) -> bool {
    from == to || allowed_transitions(from).contains(&to)
}
