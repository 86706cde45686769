//! # Transition Validator
//!
//! Pure decision procedure over the status graph:
//!
//! ```text
//! pending      -> ai_analyzing, rejected
//! ai_analyzing -> assigned, rejected
//! assigned     -> in_progress, rejected
//! in_progress  -> resolved, rejected
//! ```
//!
//! `resolved` and `rejected` are terminal. Field requirements are checked
//! jointly with the edge so a structurally valid but field-incomplete
//! request fails atomically.

use shared_types::entities::{
    Issue, IssueCategory, IssueStatus, Priority, ResolutionProof, UserId,
};
use shared_types::errors::CoreError;
use shared_types::time::Timestamp;

/// Extra fields accompanying a transition request.
///
/// Which fields are required depends on the target edge; unrelated fields
/// must be absent for the write to be accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionFields {
    /// Classification, applied on `pending -> ai_analyzing`.
    pub category: Option<IssueCategory>,
    /// Triage priority, applied on `pending -> ai_analyzing`.
    pub priority: Option<Priority>,
    /// Required on any transition into `assigned`.
    pub assigned_authority_id: Option<UserId>,
    /// Required (and complete) on any transition into `resolved`.
    pub resolution_proof: Option<ResolutionProof>,
}

impl TransitionFields {
    /// Fields for the triage completion edge.
    #[must_use]
    pub fn classified(category: IssueCategory, priority: Priority) -> Self {
        Self {
            category: Some(category),
            priority: Some(priority),
            ..Self::default()
        }
    }

    /// Fields for an assignment edge.
    #[must_use]
    pub fn assigned_to(authority: UserId) -> Self {
        Self {
            assigned_authority_id: Some(authority),
            ..Self::default()
        }
    }

    /// Fields for a resolution edge.
    #[must_use]
    pub fn resolved_with(proof: ResolutionProof) -> Self {
        Self {
            resolution_proof: Some(proof),
            ..Self::default()
        }
    }
}

/// True if the edge `from -> to` is in the status graph.
#[must_use]
pub fn edge_exists(from: IssueStatus, to: IssueStatus) -> bool {
    use IssueStatus::{AiAnalyzing, Assigned, InProgress, Pending, Rejected, Resolved};
    matches!(
        (from, to),
        (Pending, AiAnalyzing)
            | (Pending, Rejected)
            | (AiAnalyzing, Assigned)
            | (AiAnalyzing, Rejected)
            | (Assigned, InProgress)
            | (Assigned, Rejected)
            | (InProgress, Resolved)
            | (InProgress, Rejected)
    )
}

/// Decide whether the requested status change is legal for the current
/// record, including the field requirements of the target edge.
///
/// # Errors
/// - `InvalidTransition`: edge not in the graph, or a field required by the
///   edge is absent or incomplete
pub fn check(
    current: &Issue,
    to: IssueStatus,
    fields: &TransitionFields,
) -> Result<(), CoreError> {
    let from = current.status;

    if !edge_exists(from, to) {
        let reason = if from.is_terminal() {
            format!("{from} is terminal")
        } else {
            "edge not in graph".to_string()
        };
        return Err(CoreError::InvalidTransition { from, to, reason });
    }

    // Field requirements are part of the edge check, not a separate pass.
    if to == IssueStatus::Assigned && fields.assigned_authority_id.is_none() {
        return Err(CoreError::InvalidTransition {
            from,
            to,
            reason: "assigned_authority_id is required".to_string(),
        });
    }
    if to == IssueStatus::Resolved {
        match &fields.resolution_proof {
            Some(proof) if proof.is_complete() => {}
            Some(_) => {
                return Err(CoreError::InvalidTransition {
                    from,
                    to,
                    reason: "resolution proof is incomplete".to_string(),
                });
            }
            None => {
                return Err(CoreError::InvalidTransition {
                    from,
                    to,
                    reason: "resolution proof is required".to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Build the successor record for a validated transition.
///
/// Stamps `assigned_at`/`resolved_at` exactly once (each edge into the
/// corresponding status is reachable only once per record) and bumps
/// `version` to `expected_version + 1`.
#[must_use]
pub fn build_updated(
    current: &Issue,
    to: IssueStatus,
    fields: &TransitionFields,
    expected_version: u64,
    now: Timestamp,
) -> Issue {
    let mut updated = current.clone();
    updated.status = to;
    updated.version = expected_version + 1;

    if let Some(category) = fields.category {
        updated.category = category;
    }
    if let Some(priority) = fields.priority {
        updated.priority = Some(priority);
    }
    if to == IssueStatus::Assigned {
        updated.assigned_authority_id = fields.assigned_authority_id;
        updated.assigned_at = Some(now);
    }
    if to == IssueStatus::Resolved {
        updated.resolution_proof = fields.resolution_proof.clone();
        updated.resolved_at = Some(now);
    }

    updated
}
