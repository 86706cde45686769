//! # Error Types
//!
//! The error taxonomy shared across subsystems. Callers branch on the
//! variant: `Conflict` means re-fetch and retry, everything else is
//! surfaced as-is.

use crate::entities::{IssueId, IssueStatus, UserId};
use thiserror::Error;

/// Errors produced by the lifecycle engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoreError {
    /// Missing or malformed required field. Not retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The actor lacks the capability for this operation.
    ///
    /// Checked before transition legality, so an unauthorized caller never
    /// learns whether the requested transition would have been legal.
    #[error("Actor {actor} is not authorized to {action}")]
    Authorization { actor: UserId, action: String },

    /// The requested edge is not in the state graph, or a field required by
    /// that edge is absent.
    #[error("Invalid transition {from} -> {to}: {reason}")]
    InvalidTransition {
        from: IssueStatus,
        to: IssueStatus,
        reason: String,
    },

    /// Stale `expected_version`. The caller must re-fetch the now-current
    /// record before retrying; the core never auto-retries a caller's
    /// mutation.
    #[error("Version conflict on issue {id}: expected {expected}, current {actual}")]
    Conflict {
        id: IssueId,
        expected: u64,
        actual: u64,
    },

    /// Unknown issue id.
    #[error("Issue not found: {0}")]
    NotFound(IssueId),

    /// Unknown user id.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// A collaborator (AI triage, media store, notifications) failed.
    #[error("Upstream collaborator error: {0}")]
    Upstream(String),

    /// Invariant breach inside the engine (e.g. poisoned lock).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// True for errors a caller may resolve by re-fetching and retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
