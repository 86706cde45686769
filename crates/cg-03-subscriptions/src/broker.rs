//! # Subscription Broker
//!
//! Accepts client-declared filters, reads the catch-up snapshot from the
//! Entity Store, and pumps live bus events into per-client feeds.
//!
//! The live bus subscription is opened before the snapshot is read, so a
//! write landing between the two shows up on the live side; the per-issue
//! last-seen-version map then suppresses anything the snapshot already
//! delivered. For a single issue id a feed is therefore gapless and
//! non-decreasing in version.

use crate::feed::{FeedEvent, IssueFeed};
use cg_01_issue_store::ports::store::IssueStore;
use shared_bus::{CivicEvent, EventFilter, EventSubscriber, EventTopic, Subscription};
use shared_types::entities::{Issue, IssueId};
use shared_types::errors::CoreError;
use shared_types::filters::IssueFilter;
use shared_types::time::TimeSource;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Tuning for per-client feeds.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Events buffered per feed before the client counts as too slow.
    pub feed_capacity: usize,
    /// Interval between heartbeats on idle feeds.
    pub heartbeat_interval: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            feed_capacity: 256,
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

/// Fans out committed issue changes to any number of client feeds.
pub struct SubscriptionBroker {
    store: Arc<dyn IssueStore>,
    bus: Arc<dyn EventSubscriber>,
    clock: Arc<dyn TimeSource>,
    config: BrokerConfig,
}

impl SubscriptionBroker {
    /// Create a broker over the given store and bus.
    pub fn new(
        store: Arc<dyn IssueStore>,
        bus: Arc<dyn EventSubscriber>,
        clock: Arc<dyn TimeSource>,
        config: BrokerConfig,
    ) -> Self {
        Self {
            store,
            bus,
            clock,
            config,
        }
    }

    /// Open a feed for `filter`.
    ///
    /// With `since_version`, the feed starts with a catch-up snapshot of
    /// every currently-matching record whose version exceeds the watermark,
    /// then continues live. Without it, the snapshot covers all matching
    /// records.
    ///
    /// # Errors
    /// - `Internal`: snapshot read failed
    pub async fn subscribe(
        &self,
        filter: IssueFilter,
        since_version: Option<u64>,
    ) -> Result<IssueFeed, CoreError> {
        // Live first, snapshot second: a commit landing in between is seen
        // twice at worst, never missed.
        let live = self
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Lifecycle]));

        let watermark = since_version.unwrap_or(0);
        let snapshot: Vec<Issue> = self
            .store
            .list_all(&filter)
            .await?
            .into_iter()
            .filter(|issue| issue.version > watermark)
            .collect();

        info!(
            filter = ?filter,
            since_version = watermark,
            snapshot_len = snapshot.len(),
            "Subscription opened"
        );

        let (tx, rx) = mpsc::channel(self.config.feed_capacity);
        let heartbeat = self.config.heartbeat_interval;
        let clock = self.clock.clone();
        let pump = tokio::spawn(async move {
            pump_feed(live, snapshot, filter, tx, heartbeat, clock).await;
        });

        Ok(IssueFeed::new(rx, pump))
    }
}

/// Per-subscription pump: catch-up snapshot, then live events with per-id
/// version monotonicity, plus heartbeats.
async fn pump_feed(
    mut live: Subscription,
    snapshot: Vec<Issue>,
    filter: IssueFilter,
    tx: mpsc::Sender<FeedEvent>,
    heartbeat: Duration,
    clock: Arc<dyn TimeSource>,
) {
    let mut last_seen: HashMap<IssueId, u64> = HashMap::new();

    // Catch-up is pull-paced: awaitable sends let a client drain at its own
    // speed before the live phase starts.
    for issue in snapshot {
        last_seen.insert(issue.id, issue.version);
        if tx.send(FeedEvent::Upsert(issue)).await.is_err() {
            debug!("Feed closed during catch-up");
            return;
        }
    }

    let mut ticker = interval_at(Instant::now() + heartbeat, heartbeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = tx.closed() => {
                debug!("Feed receiver dropped; stopping pump");
                return;
            }
            event = live.recv() => {
                let Some(event) = event else {
                    debug!("Bus closed; ending feed");
                    return;
                };
                let CivicEvent::IssueUpserted(issue) = event else {
                    continue;
                };
                if !filter.matches(&issue) {
                    continue;
                }

                // Per-id monotonicity: drop anything at or below what this
                // feed already delivered for the id.
                let last = last_seen.get(&issue.id).copied().unwrap_or(0);
                if issue.version <= last {
                    continue;
                }
                last_seen.insert(issue.id, issue.version);

                match tx.try_send(FeedEvent::Upsert(issue)) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        // Live phase never blocks the bus on one client.
                        warn!("Feed buffer overflow; disconnecting slow client");
                        return;
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => return,
                }
            }
            _ = ticker.tick() => {
                let beat = FeedEvent::Heartbeat { at: clock.now() };
                if tx.try_send(beat).is_err() {
                    // Full or closed: either way this client is done.
                    warn!("Feed stalled at heartbeat; disconnecting");
                    return;
                }
            }
        }
    }
}
