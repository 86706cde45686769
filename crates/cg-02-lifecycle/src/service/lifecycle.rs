//! # Lifecycle Service
//!
//! Orchestrates create/transition requests: role gate, then transition
//! validator, then the store's compare-and-set. Triage results from the AI
//! collaborator flow through the same compare-and-set discipline, so a late
//! classification can never clobber a concurrent authority edit.

use crate::domain::role_gate::{authorize, Action};
use crate::domain::transitions::{self, TransitionFields};
use crate::domain::validation::validate_submission;
use crate::ports::inbound::{LifecycleApi, SubmitIssue, TransitionRequest};
use crate::ports::outbound::TriageClient;
use crate::service::triage::{run_with_backoff, TriageConfig, TriageOutcome};
use async_trait::async_trait;
use cg_01_issue_store::domain::NewIssue;
use cg_01_issue_store::ports::store::IssueStore;
use shared_bus::{CivicEvent, EventPublisher};
use shared_types::entities::{Actor, Issue, IssueId, IssueStatus};
use shared_types::errors::CoreError;
use shared_types::time::TimeSource;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Attempts to land a triage result before giving up on a busy record.
/// Each retry re-fetches; a record that left `Pending` ends the loop early.
const MAX_TRIAGE_CAS_ATTEMPTS: u32 = 3;

/// Orchestrator for all issue mutations.
#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<dyn IssueStore>,
    triage: Arc<dyn TriageClient>,
    bus: Arc<dyn EventPublisher>,
    clock: Arc<dyn TimeSource>,
    triage_config: TriageConfig,
}

impl LifecycleService {
    /// Create a service over the given store and collaborators.
    pub fn new(
        store: Arc<dyn IssueStore>,
        triage: Arc<dyn TriageClient>,
        bus: Arc<dyn EventPublisher>,
        clock: Arc<dyn TimeSource>,
        triage_config: TriageConfig,
    ) -> Self {
        Self {
            store,
            triage,
            bus,
            clock,
            triage_config,
        }
    }

    /// Run one full triage pass for an issue: classify with backoff, then
    /// land the result via compare-and-set.
    ///
    /// Public so tests can drive the pass deterministically; `submit_issue`
    /// spawns it fire-and-forget.
    pub async fn run_triage_once(&self, issue: Issue) {
        let issue_id = issue.id;
        let outcome = run_with_backoff(&self.triage, &self.triage_config, &issue).await;

        if let TriageOutcome::Fallback {
            attempts,
            last_error,
        } = &outcome
        {
            self.bus
                .publish(CivicEvent::TriageFailed {
                    issue_id,
                    attempts: *attempts,
                    error: last_error.clone(),
                })
                .await;
        }

        if let Err(err) = self.apply_triage_outcome(issue_id, &outcome).await {
            error!(issue_id = %issue_id, error = %err, "Failed to apply triage outcome");
        }
    }

    /// Land a triage outcome with the same compare-and-set discipline as a
    /// human edit. A record that already left `Pending` wins; the late
    /// classification is dropped.
    async fn apply_triage_outcome(
        &self,
        issue_id: IssueId,
        outcome: &TriageOutcome,
    ) -> Result<(), CoreError> {
        let (category, priority) = outcome.classification();

        for attempt in 1..=MAX_TRIAGE_CAS_ATTEMPTS {
            let current = self.store.get(&issue_id).await?;
            if current.status != IssueStatus::Pending {
                debug!(
                    issue_id = %issue_id,
                    status = %current.status,
                    "Issue moved on before triage landed; dropping classification"
                );
                return Ok(());
            }

            let fields = TransitionFields {
                category: Some(category),
                priority,
                ..TransitionFields::default()
            };
            transitions::check(&current, IssueStatus::AiAnalyzing, &fields)?;
            let updated = transitions::build_updated(
                &current,
                IssueStatus::AiAnalyzing,
                &fields,
                current.version,
                self.clock.now(),
            );

            match self.store.compare_and_set(current.version, updated).await {
                Ok(committed) => {
                    info!(
                        issue_id = %issue_id,
                        category = ?committed.category,
                        priority = ?committed.priority,
                        version = committed.version,
                        "Triage classification committed"
                    );
                    return Ok(());
                }
                Err(CoreError::Conflict { .. }) if attempt < MAX_TRIAGE_CAS_ATTEMPTS => {
                    debug!(issue_id = %issue_id, attempt, "Triage write conflicted; re-fetching");
                }
                Err(err) => return Err(err),
            }
        }

        warn!(issue_id = %issue_id, "Gave up landing triage result after repeated conflicts");
        Ok(())
    }
}

#[async_trait]
impl LifecycleApi for LifecycleService {
    async fn submit_issue(&self, request: SubmitIssue) -> Result<Issue, CoreError> {
        authorize(&request.reporter, Action::SubmitIssue, None)?;
        validate_submission(&request.description, &request.photos, &request.location)?;

        let issue = self
            .store
            .create(NewIssue {
                reporter_id: request.reporter.user_id,
                description: request.description,
                photos: request.photos,
                location: request.location,
            })
            .await?;

        info!(issue_id = %issue.id, reporter = %issue.reporter_id, "Issue submitted");

        // Fire-and-forget: the triage pass owns its own retries and lands
        // results through compare-and-set.
        let service = self.clone();
        let snapshot = issue.clone();
        tokio::spawn(async move {
            service.run_triage_once(snapshot).await;
        });

        Ok(issue)
    }

    async fn transition_status(&self, request: TransitionRequest) -> Result<Issue, CoreError> {
        let issue = self.store.get(&request.issue_id).await?;

        // Role gate first: an unauthorized caller learns nothing about the
        // legality of the requested edge.
        authorize(&request.actor, Action::Transition, Some(&issue))?;

        if issue.version != request.expected_version {
            return Err(CoreError::Conflict {
                id: issue.id,
                expected: request.expected_version,
                actual: issue.version,
            });
        }

        transitions::check(&issue, request.new_status, &request.fields)?;
        let updated = transitions::build_updated(
            &issue,
            request.new_status,
            &request.fields,
            request.expected_version,
            self.clock.now(),
        );

        let committed = self
            .store
            .compare_and_set(request.expected_version, updated)
            .await?;

        info!(
            issue_id = %committed.id,
            actor = %request.actor.user_id,
            status = %committed.status,
            version = committed.version,
            "Status transition committed"
        );
        Ok(committed)
    }

    async fn get_issue(&self, actor: Actor, issue_id: IssueId) -> Result<Issue, CoreError> {
        let issue = self.store.get(&issue_id).await?;
        authorize(&actor, Action::ReadIssue, Some(&issue))?;
        Ok(issue)
    }
}
