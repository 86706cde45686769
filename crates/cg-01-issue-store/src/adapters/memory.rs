//! # In-Memory Store Adapter
//!
//! Reference implementation of the store ports backed by
//! `RwLock<HashMap>`. Single-node deployments run on this adapter; durable
//! backends plug in behind the same traits.
//!
//! Writes are validated and committed under the write lock, then published
//! to the bus after the lock is released. Two racing writers on one record
//! therefore serialize on `version`: the first commit wins, the second gets
//! `Conflict`. Publish order across records is not guaranteed; consumers
//! keep per-id last-seen versions.

use crate::domain::{immutable_fields_match, Cursor, NewIssue, Page};
use crate::ports::store::{IssueStore, UserStore};
use async_trait::async_trait;
use shared_bus::{CivicEvent, EventPublisher};
use shared_types::entities::{Issue, IssueCategory, IssueId, IssueStatus, User, UserId};
use shared_types::errors::CoreError;
use shared_types::filters::IssueFilter;
use shared_types::time::TimeSource;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// In-memory implementation of `IssueStore`.
pub struct InMemoryIssueStore {
    records: RwLock<HashMap<IssueId, Issue>>,
    bus: Arc<dyn EventPublisher>,
    clock: Arc<dyn TimeSource>,
}

impl InMemoryIssueStore {
    /// Create a store publishing committed writes to `bus`.
    pub fn new(bus: Arc<dyn EventPublisher>, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            bus,
            clock,
        }
    }

    /// Number of records currently held.
    ///
    /// # Errors
    /// - `Internal`: poisoned lock
    pub fn len(&self) -> Result<usize, CoreError> {
        Ok(self.read_guard()?.len())
    }

    /// True if the store holds no records.
    pub fn is_empty(&self) -> Result<bool, CoreError> {
        Ok(self.len()? == 0)
    }

    fn read_guard(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<IssueId, Issue>>, CoreError> {
        self.records
            .read()
            .map_err(|_| CoreError::Internal("issue store lock poisoned".to_string()))
    }

    fn write_guard(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<IssueId, Issue>>, CoreError> {
        self.records
            .write()
            .map_err(|_| CoreError::Internal("issue store lock poisoned".to_string()))
    }

    /// Matching records in stable `(created_at, id)` listing order.
    fn sorted_matches(&self, filter: &IssueFilter) -> Result<Vec<Issue>, CoreError> {
        let guard = self.read_guard()?;
        let mut matches: Vec<Issue> = guard
            .values()
            .filter(|issue| filter.matches(issue))
            .cloned()
            .collect();
        drop(guard);
        matches.sort_by_key(|issue| (issue.created_at, issue.id.0));
        Ok(matches)
    }
}

#[async_trait]
impl IssueStore for InMemoryIssueStore {
    async fn create(&self, new_issue: NewIssue) -> Result<Issue, CoreError> {
        let issue = Issue {
            id: IssueId::new(),
            reporter_id: new_issue.reporter_id,
            category: IssueCategory::Unclassified,
            description: new_issue.description,
            photos: new_issue.photos,
            location: new_issue.location,
            status: IssueStatus::Pending,
            priority: None,
            assigned_authority_id: None,
            resolution_proof: None,
            created_at: self.clock.now(),
            assigned_at: None,
            resolved_at: None,
            version: 1,
        };

        {
            let mut guard = self.write_guard()?;
            guard.insert(issue.id, issue.clone());
        }

        info!(issue_id = %issue.id, reporter = %issue.reporter_id, "Issue record created");
        self.bus.publish(CivicEvent::IssueUpserted(issue.clone())).await;
        Ok(issue)
    }

    async fn get(&self, id: &IssueId) -> Result<Issue, CoreError> {
        self.read_guard()?
            .get(id)
            .cloned()
            .ok_or(CoreError::NotFound(*id))
    }

    async fn compare_and_set(
        &self,
        expected_version: u64,
        updated: Issue,
    ) -> Result<Issue, CoreError> {
        {
            let mut guard = self.write_guard()?;
            let current = guard
                .get(&updated.id)
                .ok_or(CoreError::NotFound(updated.id))?;

            if current.version != expected_version {
                warn!(
                    issue_id = %updated.id,
                    expected = expected_version,
                    actual = current.version,
                    "Stale write rejected"
                );
                return Err(CoreError::Conflict {
                    id: updated.id,
                    expected: expected_version,
                    actual: current.version,
                });
            }
            if updated.version != expected_version + 1 {
                return Err(CoreError::Internal(format!(
                    "proposed version {} is not expected {} + 1",
                    updated.version, expected_version
                )));
            }
            if !immutable_fields_match(current, &updated) {
                return Err(CoreError::Internal(
                    "proposed record mutates an immutable field".to_string(),
                ));
            }
            if !updated.timestamps_consistent() {
                return Err(CoreError::Internal(
                    "proposed record violates timestamp invariants".to_string(),
                ));
            }

            guard.insert(updated.id, updated.clone());
        }

        info!(
            issue_id = %updated.id,
            status = %updated.status,
            version = updated.version,
            "Issue record updated"
        );
        self.bus.publish(CivicEvent::IssueUpserted(updated.clone())).await;
        Ok(updated)
    }

    async fn list(
        &self,
        filter: &IssueFilter,
        cursor: Option<Cursor>,
        limit: usize,
    ) -> Result<Page, CoreError> {
        let matches = self.sorted_matches(filter)?;
        let remaining = matches
            .into_iter()
            .filter(|issue| cursor.map_or(true, |c| c.precedes(issue)));

        let mut items: Vec<Issue> = remaining.take(limit + 1).collect();
        let next = if items.len() > limit {
            items.truncate(limit);
            items.last().map(Cursor::after)
        } else {
            None
        };

        Ok(Page { items, next })
    }

    async fn list_all(&self, filter: &IssueFilter) -> Result<Vec<Issue>, CoreError> {
        self.sorted_matches(filter)
    }
}

/// In-memory implementation of `UserStore`.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn put_user(&self, user: User) -> Result<(), CoreError> {
        let mut guard = self
            .users
            .write()
            .map_err(|_| CoreError::Internal("user store lock poisoned".to_string()))?;
        guard.insert(user.id, user);
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<User, CoreError> {
        let guard = self
            .users
            .read()
            .map_err(|_| CoreError::Internal("user store lock poisoned".to_string()))?;
        guard.get(id).cloned().ok_or(CoreError::UserNotFound(*id))
    }
}
