//! # Civic Events
//!
//! Defines all event types that flow through the shared bus. Every committed
//! store write becomes an `IssueUpserted`; consumers are idempotent on
//! `(id, version)` so duplicate delivery is harmless.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Issue, IssueId};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CivicEvent {
    // =========================================================================
    // LIFECYCLE (store commits)
    // =========================================================================
    /// A committed create or compare-and-set; carries the full record state.
    ///
    /// This is the choreography trigger consumed by the Subscription Broker,
    /// the Aggregator, and the notification worker.
    IssueUpserted(Issue),

    // =========================================================================
    // TRIAGE (AI collaborator)
    // =========================================================================
    /// The triage retry budget was exhausted; the fallback classification is
    /// about to be applied. Published for operator visibility.
    TriageFailed {
        /// The issue that could not be classified.
        issue_id: IssueId,
        /// Number of classification attempts made.
        attempts: u32,
        /// Last error from the collaborator.
        error: String,
    },
}

impl CivicEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::IssueUpserted(_) => EventTopic::Lifecycle,
            Self::TriageFailed { .. } => EventTopic::Triage,
        }
    }

    /// The issue this event concerns.
    #[must_use]
    pub fn issue_id(&self) -> IssueId {
        match self {
            Self::IssueUpserted(issue) => issue.id,
            Self::TriageFailed { issue_id, .. } => *issue_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Committed issue state changes.
    Lifecycle,
    /// Triage collaborator outcomes.
    Triage,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &CivicEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
