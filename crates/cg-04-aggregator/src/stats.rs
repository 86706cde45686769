//! # Incremental Statistics
//!
//! Pure accumulator over issue upserts. Every update is gated on the
//! per-issue last-applied version, so replaying an event is a no-op.

use serde::Serialize;
use shared_types::entities::{Issue, IssueId, IssueStatus};
use std::collections::HashMap;

/// Counts per lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub ai_analyzing: u64,
    pub assigned: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub rejected: u64,
}

impl StatusCounts {
    fn slot(&mut self, status: IssueStatus) -> &mut u64 {
        match status {
            IssueStatus::Pending => &mut self.pending,
            IssueStatus::AiAnalyzing => &mut self.ai_analyzing,
            IssueStatus::Assigned => &mut self.assigned,
            IssueStatus::InProgress => &mut self.in_progress,
            IssueStatus::Resolved => &mut self.resolved,
            IssueStatus::Rejected => &mut self.rejected,
        }
    }
}

/// Snapshot served to dashboards and the landing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    /// Total issues ever created.
    pub total: u64,
    /// Current counts by status.
    pub by_status: StatusCounts,
    /// Issues that reached `Resolved`.
    pub resolved: u64,
    /// Running mean of `resolved_at - created_at` in milliseconds, `None`
    /// until the first resolution.
    pub mean_resolution_ms: Option<f64>,
    /// Upserts applied (diagnostics; duplicates excluded).
    pub events_applied: u64,
}

/// Mutable accumulator behind the aggregator.
#[derive(Debug, Default)]
pub struct StatsState {
    total: u64,
    by_status: StatusCounts,
    resolved: u64,
    mean_resolution_ms: f64,
    events_applied: u64,
    /// Last applied version per issue; the idempotence gate.
    last_applied: HashMap<IssueId, u64>,
    /// Current status per issue, for decrementing on movement.
    status_by_id: HashMap<IssueId, IssueStatus>,
}

impl StatsState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one upsert. Returns `false` when the event was a duplicate or
    /// stale and nothing changed.
    pub fn apply(&mut self, issue: &Issue) -> bool {
        if let Some(&last) = self.last_applied.get(&issue.id) {
            if issue.version <= last {
                return false;
            }
        }

        let previous = self.status_by_id.get(&issue.id).copied();
        match previous {
            Some(status) if status != issue.status => {
                let slot = self.by_status.slot(status);
                *slot = slot.saturating_sub(1);
                *self.by_status.slot(issue.status) += 1;
            }
            Some(_) => {} // metadata-only write, counts unchanged
            None => {
                self.total += 1;
                *self.by_status.slot(issue.status) += 1;
            }
        }

        // First arrival in Resolved; terminal, so exactly once per issue.
        // Also covers records first observed as Resolved (rebuilds).
        if issue.status == IssueStatus::Resolved && previous != Some(IssueStatus::Resolved) {
            if let Some(resolved_at) = issue.resolved_at {
                let duration = resolved_at.saturating_sub(issue.created_at) as f64;
                self.resolved += 1;
                self.mean_resolution_ms +=
                    (duration - self.mean_resolution_ms) / self.resolved as f64;
            }
        }

        self.status_by_id.insert(issue.id, issue.status);
        self.last_applied.insert(issue.id, issue.version);
        self.events_applied += 1;
        true
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> AggregateStats {
        AggregateStats {
            total: self.total,
            by_status: self.by_status,
            resolved: self.resolved,
            mean_resolution_ms: (self.resolved > 0).then_some(self.mean_resolution_ms),
            events_applied: self.events_applied,
        }
    }

    /// Drop everything; used before a rebuild from the store.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
