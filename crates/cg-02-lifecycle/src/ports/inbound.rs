//! # Inbound Port - LifecycleApi
//!
//! Primary driving port exposing the issue lifecycle to clients.
//!
//! ## Authorization (role gate)
//!
//! | Method | Authorized Caller |
//! |--------|-------------------|
//! | `submit_issue` | Citizen |
//! | `transition_status` | Authority |
//! | `get_issue` | Authority; Citizen for own issues |

use crate::domain::transitions::TransitionFields;
use async_trait::async_trait;
use shared_types::entities::{Actor, GeoPoint, Issue, IssueId, IssueStatus, MediaRef};
use shared_types::errors::CoreError;

/// A new issue report from a citizen.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitIssue {
    /// The reporting citizen, as resolved by the identity provider.
    pub reporter: Actor,
    pub description: String,
    pub photos: Vec<MediaRef>,
    pub location: GeoPoint,
}

/// A request to move an issue along the status graph.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub issue_id: IssueId,
    /// The calling actor, as resolved by the identity provider.
    pub actor: Actor,
    pub new_status: IssueStatus,
    /// Edge-specific fields, validated jointly with the edge.
    pub fields: TransitionFields,
    /// The version the caller last observed; stale values are rejected with
    /// `Conflict` and never silently overwritten.
    pub expected_version: u64,
}

/// Primary API for the Lifecycle subsystem.
///
/// # Example
///
/// ```rust,ignore
/// use cg_02_lifecycle::ports::inbound::LifecycleApi;
///
/// async fn example(api: &impl LifecycleApi, req: SubmitIssue) {
///     let issue = api.submit_issue(req).await.unwrap();
///     // issue.status == Pending, issue.version == 1
/// }
/// ```
#[async_trait]
pub trait LifecycleApi: Send + Sync {
    /// Validate and create a new issue in `Pending`, then request triage
    /// from the AI collaborator (fire-and-forget).
    ///
    /// # Errors
    /// - `Authorization`: caller is not a citizen
    /// - `Validation`: missing/malformed required field
    async fn submit_issue(&self, request: SubmitIssue) -> Result<Issue, CoreError>;

    /// Run the role gate, the transition validator, and the store's
    /// compare-and-set, in that order.
    ///
    /// # Errors
    /// - `Authorization`: capability missing (checked first)
    /// - `InvalidTransition`: illegal edge or incomplete edge fields
    /// - `Conflict`: stale `expected_version`; re-fetch and retry
    /// - `NotFound`: unknown issue
    async fn transition_status(&self, request: TransitionRequest) -> Result<Issue, CoreError>;

    /// Fetch one issue, subject to the read capability.
    ///
    /// # Errors
    /// - `Authorization`: citizens may only read their own issues
    /// - `NotFound`: unknown issue
    async fn get_issue(&self, actor: Actor, issue_id: IssueId) -> Result<Issue, CoreError>;
}
