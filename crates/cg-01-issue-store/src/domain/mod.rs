//! Store domain types: creation payloads, pagination, and the write-time
//! record checks that back the optimistic-concurrency contract.

use serde::{Deserialize, Serialize};
use shared_types::entities::{GeoPoint, Issue, IssueId, MediaRef, UserId};
use shared_types::time::Timestamp;

/// Payload for creating a new issue record.
///
/// The store assigns `id`, `created_at`, `status = Pending`,
/// `category = Unclassified` and `version = 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIssue {
    pub reporter_id: UserId,
    pub description: String,
    pub photos: Vec<MediaRef>,
    pub location: GeoPoint,
}

/// Restartable pagination cursor, keyed on the stable `(created_at, id)`
/// listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub created_at: Timestamp,
    pub id: IssueId,
}

impl Cursor {
    /// The cursor pointing just past the given record.
    #[must_use]
    pub fn after(issue: &Issue) -> Self {
        Self {
            created_at: issue.created_at,
            id: issue.id,
        }
    }

    /// Listing-order comparison: does `issue` come after this cursor?
    #[must_use]
    pub fn precedes(&self, issue: &Issue) -> bool {
        (issue.created_at, issue.id.0) > (self.created_at, self.id.0)
    }
}

/// One page of a lazy, restartable listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Issue>,
    /// Cursor to resume from, `None` when the listing is exhausted.
    pub next: Option<Cursor>,
}

/// Check that a proposed record keeps every immutable field of the current
/// one. Violations are engine bugs, not caller errors.
#[must_use]
pub fn immutable_fields_match(current: &Issue, updated: &Issue) -> bool {
    current.id == updated.id
        && current.reporter_id == updated.reporter_id
        && current.description == updated.description
        && current.photos == updated.photos
        && current.location == updated.location
        && current.created_at == updated.created_at
}
