//! # Role Gate
//!
//! Capability table (policy, not inheritance):
//!
//! | Action | Citizen | Authority |
//! |--------|---------|-----------|
//! | `SubmitIssue` | yes | no |
//! | `ReadIssue` | own issues only | any |
//! | `Transition` | no | any |
//! | `ReadStats` | yes | yes |
//!
//! The gate runs before the Transition Validator, so an unauthorized caller
//! never learns whether their requested transition was otherwise legal.
//! No per-department partitioning is modeled; any authority may act on any
//! issue.

use shared_types::entities::{Actor, Issue, Role};
use shared_types::errors::CoreError;

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SubmitIssue,
    ReadIssue,
    Transition,
    ReadStats,
}

impl Action {
    /// Wire-level name used in authorization errors.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SubmitIssue => "submit_issue",
            Self::ReadIssue => "read_issue",
            Self::Transition => "transition_status",
            Self::ReadStats => "read_stats",
        }
    }
}

/// Check whether `actor` may perform `action`, optionally on `issue`.
///
/// # Errors
/// - `Authorization`: the capability table does not grant the action
pub fn authorize(actor: &Actor, action: Action, issue: Option<&Issue>) -> Result<(), CoreError> {
    let denied = || CoreError::Authorization {
        actor: actor.user_id,
        action: action.name().to_string(),
    };

    match (actor.role, action) {
        (Role::Citizen, Action::SubmitIssue) => Ok(()),
        (Role::Citizen, Action::ReadIssue) => match issue {
            Some(issue) if issue.reporter_id == actor.user_id => Ok(()),
            _ => Err(denied()),
        },
        (Role::Citizen, Action::Transition) => Err(denied()),
        (Role::Authority, Action::ReadIssue | Action::Transition) => Ok(()),
        (Role::Authority, Action::SubmitIssue) => Err(denied()),
        (_, Action::ReadStats) => Ok(()),
    }
}
