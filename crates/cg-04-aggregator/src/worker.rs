//! # Aggregator Worker
//!
//! Owns the shared `StatsState`, consumes lifecycle events from the bus,
//! and serves snapshots to dashboards. State is derived and rebuildable; a
//! restart re-derives everything from a full store scan.

use crate::stats::{AggregateStats, StatsState};
use cg_01_issue_store::ports::store::IssueStore;
use shared_bus::{CivicEvent, Subscription};
use shared_types::errors::CoreError;
use shared_types::filters::IssueFilter;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Shared handle around the stats accumulator.
#[derive(Clone, Default)]
pub struct Aggregator {
    state: Arc<RwLock<StatsState>>,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current statistics snapshot (public; both roles may read).
    #[must_use]
    pub fn snapshot(&self) -> AggregateStats {
        self.state
            .read()
            .map(|state| state.snapshot())
            .unwrap_or_default()
    }

    /// Re-derive all statistics from a full store scan.
    ///
    /// # Errors
    /// - `Internal`: the scan failed
    pub async fn rebuild(&self, store: &dyn IssueStore) -> Result<(), CoreError> {
        let issues = store.list_all(&IssueFilter::All).await?;
        let mut state = self
            .state
            .write()
            .map_err(|_| CoreError::Internal("aggregator lock poisoned".to_string()))?;
        state.reset();
        for issue in &issues {
            state.apply(issue);
        }
        info!(issues = issues.len(), "Aggregator rebuilt from store");
        Ok(())
    }

    /// Spawn the consuming worker on the given bus subscription.
    ///
    /// Stops when the shutdown signal flips to `true` or the bus closes.
    pub fn spawn(
        &self,
        mut subscription: Subscription,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let state = self.state.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    event = subscription.recv() => {
                        let Some(event) = event else { break };
                        if let CivicEvent::IssueUpserted(issue) = event {
                            if let Ok(mut guard) = state.write() {
                                guard.apply(&issue);
                            }
                        }
                    }
                }
            }
            debug!("Aggregator worker stopped");
        })
    }
}
