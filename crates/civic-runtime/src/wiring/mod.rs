//! # Subsystem Wiring Module
//!
//! Connects the subsystems through the shared event bus.
//!
//! ## Architecture Principle
//!
//! Each subsystem defines its **ports** (traits). The runtime provides
//! the adapters and wires subsystems together; subsystems never call each
//! other directly.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        EVENT BUS                             │
//! │        (shared-bus crate - committed change fan-out)         │
//! └──────────┬──────────────┬──────────────┬─────────────────────┘
//!            │              │              │
//!    IssueUpserted   IssueUpserted   IssueUpserted
//!            ▼              ▼              ▼
//!   ┌────────────┐  ┌────────────┐  ┌──────────────┐
//!   │     3      │  │     4      │  │ Notification │
//!   │ Subscript. │  │ Aggregator │  │    worker    │
//!   └────────────┘  └────────────┘  └──────────────┘
//!            ▲ publish on commit
//!   ┌────────┴───┐      ┌────────────┐
//!   │     1      │◄─CAS─│     2      │◄── submit / transition
//!   │ IssueStore │      │ Lifecycle  │
//!   └────────────┘      └────────────┘
//! ```

use crate::container::GridConfig;
use cg_01_issue_store::adapters::memory::{InMemoryIssueStore, InMemoryUserStore};
use cg_02_lifecycle::{
    LifecycleService, NotificationDispatcher, NotificationWorker, TriageClient,
};
use cg_03_subscriptions::SubscriptionBroker;
use cg_04_aggregator::Aggregator;
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus};
use shared_types::time::SystemTimeSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// All wired subsystems plus their background workers.
///
/// Built once at startup; `shutdown` tears the workers down gracefully.
pub struct GridServices {
    pub bus: Arc<InMemoryEventBus>,
    pub store: Arc<InMemoryIssueStore>,
    pub users: Arc<InMemoryUserStore>,
    pub lifecycle: Arc<LifecycleService>,
    pub broker: Arc<SubscriptionBroker>,
    pub aggregator: Aggregator,
    workers: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl GridServices {
    /// Wire every subsystem over a fresh bus and store.
    ///
    /// The triage client and notification dispatcher are the deployment's
    /// choice of collaborator adapters.
    pub fn build(
        config: &GridConfig,
        triage: Arc<dyn TriageClient>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let clock = Arc::new(SystemTimeSource);
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus.capacity));
        let store = Arc::new(InMemoryIssueStore::new(bus.clone(), clock.clone()));
        let users = Arc::new(InMemoryUserStore::new());

        let lifecycle = Arc::new(LifecycleService::new(
            store.clone(),
            triage,
            bus.clone(),
            clock.clone(),
            config.triage.to_triage_config(),
        ));

        let broker = Arc::new(SubscriptionBroker::new(
            store.clone(),
            bus.clone(),
            clock,
            config.subscriptions.to_broker_config(),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Derived-state workers ride the same lifecycle topic.
        let aggregator = Aggregator::new();
        let aggregator_worker = aggregator.spawn(
            bus.subscribe(EventFilter::topics(vec![EventTopic::Lifecycle])),
            shutdown_rx.clone(),
        );
        let notify_worker = NotificationWorker::spawn(
            bus.subscribe(EventFilter::topics(vec![EventTopic::Lifecycle])),
            dispatcher,
            shutdown_rx,
        );

        info!("Grid services wired");

        Self {
            bus,
            store,
            users,
            lifecycle,
            broker,
            aggregator,
            workers: vec![aggregator_worker, notify_worker],
            shutdown_tx,
        }
    }

    /// Public aggregate statistics, gated on the read-stats capability.
    ///
    /// # Errors
    /// - `Authorization`: the capability table does not grant the read
    pub fn aggregate_stats(
        &self,
        actor: &shared_types::entities::Actor,
    ) -> Result<cg_04_aggregator::AggregateStats, shared_types::errors::CoreError> {
        cg_02_lifecycle::domain::role_gate::authorize(
            actor,
            cg_02_lifecycle::Action::ReadStats,
            None,
        )?;
        Ok(self.aggregator.snapshot())
    }

    /// Signal workers to stop and wait for them to finish.
    pub async fn shutdown(mut self) {
        if self.shutdown_tx.send(true).is_err() {
            warn!("All workers already gone at shutdown");
        }
        for worker in self.workers.drain(..) {
            match tokio::time::timeout(Duration::from_secs(5), worker).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) if join_err.is_cancelled() => {}
                Ok(Err(join_err)) => warn!(error = %join_err, "Worker ended abnormally"),
                Err(_) => warn!("Worker did not stop within 5s; abandoning"),
            }
        }
        info!("Grid services shut down");
    }
}
