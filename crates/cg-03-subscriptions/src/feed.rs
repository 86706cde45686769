//! # Issue Feed
//!
//! The client-facing end of a subscription: an ordered sequence of
//! `FeedEvent`s behind a bounded channel. Dropping the feed cancels the
//! subscription immediately.

use shared_types::entities::Issue;
use shared_types::time::Timestamp;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tracing::debug;

/// One element of a subscription feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A record state the client has not seen yet (catch-up or live).
    Upsert(Issue),
    /// Liveness signal for idle feeds.
    Heartbeat { at: Timestamp },
}

/// A live, filtered, ordered feed of issue changes for one client.
///
/// Ends (returns `None`) when the broker shuts down or the client was
/// disconnected for overflowing its buffer. Dropping the feed aborts the
/// pump task and releases all per-subscription resources; the Entity Store
/// is unaffected.
pub struct IssueFeed {
    receiver: mpsc::Receiver<FeedEvent>,
    pump: JoinHandle<()>,
}

impl IssueFeed {
    pub(crate) fn new(receiver: mpsc::Receiver<FeedEvent>, pump: JoinHandle<()>) -> Self {
        Self { receiver, pump }
    }

    /// Receive the next event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - the next feed element
    /// - `None` - the feed ended
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        self.receiver.recv().await
    }

    /// Cancel the subscription. Equivalent to dropping the feed.
    pub fn unsubscribe(self) {
        // Drop impl does the cleanup.
    }
}

impl Drop for IssueFeed {
    fn drop(&mut self) {
        self.pump.abort();
        debug!("Issue feed dropped; pump aborted");
    }
}

impl Stream for IssueFeed {
    type Item = FeedEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
