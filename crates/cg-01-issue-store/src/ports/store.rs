//! # Store Ports
//!
//! Primary driving ports for record access. The Lifecycle Service and the
//! Subscription Broker depend on these traits, never on a concrete backend.

use crate::domain::{Cursor, NewIssue, Page};
use async_trait::async_trait;
use shared_types::entities::{Issue, IssueId, User, UserId};
use shared_types::errors::CoreError;
use shared_types::filters::IssueFilter;

/// Durable table of Issue records with atomic per-record read/write.
///
/// There is no cross-record transaction. Every successful `create` and
/// `compare_and_set` must hand the new record state to the event bus before
/// returning (at-least-once; downstream consumers are idempotent on
/// `(id, version)`).
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Create a new record in `Pending` at version 1.
    ///
    /// # Errors
    /// - `Internal`: storage-level failure
    async fn create(&self, new_issue: NewIssue) -> Result<Issue, CoreError>;

    /// Fetch the current state of a record.
    ///
    /// # Errors
    /// - `NotFound`: unknown id
    async fn get(&self, id: &IssueId) -> Result<Issue, CoreError>;

    /// Atomically replace a record if its current version matches
    /// `expected_version`.
    ///
    /// The proposed record must carry `version == expected_version + 1`,
    /// identical immutable fields, and consistent timestamps; violations are
    /// rejected with `Internal` (they indicate an engine bug upstream, not a
    /// caller race).
    ///
    /// # Errors
    /// - `Conflict`: the record moved; re-fetch and retry
    /// - `NotFound`: unknown id
    async fn compare_and_set(
        &self,
        expected_version: u64,
        updated: Issue,
    ) -> Result<Issue, CoreError>;

    /// One page of records matching `filter`, in stable `(created_at, id)`
    /// order, resumable via the returned cursor.
    async fn list(
        &self,
        filter: &IssueFilter,
        cursor: Option<Cursor>,
        limit: usize,
    ) -> Result<Page, CoreError>;

    /// All records matching `filter`, in listing order. Used by the
    /// Subscription Broker for catch-up snapshots and by the Aggregator for
    /// rebuilds.
    async fn list_all(&self, filter: &IssueFilter) -> Result<Vec<Issue>, CoreError>;
}

/// Durable table of User records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert or replace a user record.
    async fn put_user(&self, user: User) -> Result<(), CoreError>;

    /// Fetch a user record.
    ///
    /// # Errors
    /// - `UserNotFound`: unknown id
    async fn get_user(&self, id: &UserId) -> Result<User, CoreError>;
}
