//! # Outbound Ports
//!
//! Driven ports for the external collaborators. The core trusts the
//! identity provider as given, stores only media references, and treats
//! notification delivery as fire-and-forget.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::entities::{
    Actor, IssueCategory, IssueId, IssueStatus, MediaRef, Priority, UserId,
};
use shared_types::errors::CoreError;

/// Classification returned by the AI triage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub category: IssueCategory,
    pub priority: Priority,
    /// Classifier confidence in [0, 1]; informational only.
    pub confidence: f64,
}

/// The external AI triage collaborator.
#[async_trait]
pub trait TriageClient: Send + Sync {
    /// Classify an issue from its description and first photo.
    ///
    /// # Errors
    /// - `Upstream`: collaborator unavailable or returned a failure
    async fn classify(
        &self,
        issue_id: IssueId,
        description: &str,
        photo: &MediaRef,
    ) -> Result<TriageResult, CoreError>;
}

/// The external push-notification dispatcher.
///
/// Invoked whenever an issue transitions into `Assigned` or `Resolved`.
/// Delivery failures are logged and dropped, never retried, and never block
/// the transition that triggered them.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(
        &self,
        user_id: UserId,
        issue_id: IssueId,
        new_status: IssueStatus,
    ) -> Result<(), CoreError>;
}

/// The external identity provider.
///
/// Supplies `(user_id, role)` for an authenticated request; the core
/// performs no credential verification itself.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve an opaque auth token to an actor.
    ///
    /// # Errors
    /// - `Upstream`: token unknown or provider unavailable
    async fn resolve(&self, token: &str) -> Result<Actor, CoreError>;
}

/// The external binary media store.
///
/// Accepts a photo upload and returns the opaque reference clients attach
/// to their reports. The core stores only the reference, never the bytes.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a photo and obtain its reference.
    ///
    /// # Errors
    /// - `Upstream`: store unavailable or upload rejected
    async fn upload(&self, bytes: &[u8], content_type: &str) -> Result<MediaRef, CoreError>;
}
