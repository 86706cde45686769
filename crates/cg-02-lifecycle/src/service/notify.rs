//! # Notification Worker
//!
//! Consumes lifecycle events from the bus and invokes the external
//! notification dispatcher whenever an issue transitions into `Assigned` or
//! `Resolved`. Delivery failures are logged and dropped; they never block or
//! fail the transition that triggered them.

use crate::ports::outbound::NotificationDispatcher;
use shared_bus::{CivicEvent, Subscription};
use shared_types::entities::{IssueId, IssueStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Background worker bridging the bus to the notification dispatcher.
pub struct NotificationWorker;

impl NotificationWorker {
    /// Spawn the worker on the given subscription.
    ///
    /// The worker stops when the shutdown signal flips to `true` or the bus
    /// closes. Duplicate deliveries of the same `(id, version)` are
    /// suppressed.
    pub fn spawn(
        mut subscription: Subscription,
        dispatcher: Arc<dyn NotificationDispatcher>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut notified: HashMap<IssueId, u64> = HashMap::new();
            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    event = subscription.recv() => {
                        let Some(event) = event else { break };
                        Self::handle_event(event, &dispatcher, &mut notified).await;
                    }
                }
            }
            debug!("Notification worker stopped");
        })
    }

    async fn handle_event(
        event: CivicEvent,
        dispatcher: &Arc<dyn NotificationDispatcher>,
        notified: &mut HashMap<IssueId, u64>,
    ) {
        let CivicEvent::IssueUpserted(issue) = event else {
            return;
        };
        if !matches!(issue.status, IssueStatus::Assigned | IssueStatus::Resolved) {
            return;
        }

        // Idempotent on (id, version): duplicate delivery notifies once.
        let last = notified.get(&issue.id).copied().unwrap_or(0);
        if issue.version <= last {
            return;
        }
        notified.insert(issue.id, issue.version);

        if let Err(err) = dispatcher
            .notify(issue.reporter_id, issue.id, issue.status)
            .await
        {
            warn!(
                issue_id = %issue.id,
                user_id = %issue.reporter_id,
                error = %err,
                "Notification delivery failed; dropping"
            );
        }
    }
}
