//! # Triage Retry Loop
//!
//! Calls the AI collaborator with bounded exponential backoff. After the
//! retry budget is exhausted the issue is classified `NeedsManualReview` at
//! `Medium` priority rather than remaining stuck, so authorities can still
//! triage by hand.

use crate::ports::outbound::{TriageClient, TriageResult};
use shared_types::entities::{Issue, IssueCategory, Priority};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Retry budget for the AI triage collaborator.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Maximum classification attempts before falling back.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub base_delay: Duration,
    /// Upper bound on the backoff delay.
    pub max_delay: Duration,
    /// Per-call timeout on the collaborator.
    pub call_timeout: Duration,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            call_timeout: Duration::from_secs(10),
        }
    }
}

/// Outcome of the retry loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TriageOutcome {
    /// The collaborator classified the issue.
    Classified(TriageResult),
    /// Retry budget exhausted; the fallback classification applies.
    Fallback { attempts: u32, last_error: String },
}

impl TriageOutcome {
    /// The classification to write, fallback included.
    #[must_use]
    pub fn classification(&self) -> (IssueCategory, Option<Priority>) {
        match self {
            Self::Classified(result) => (result.category, Some(result.priority)),
            Self::Fallback { .. } => (IssueCategory::NeedsManualReview, Some(Priority::Medium)),
        }
    }
}

/// Run the classification call until it succeeds or the budget runs out.
pub async fn run_with_backoff(
    client: &Arc<dyn TriageClient>,
    config: &TriageConfig,
    issue: &Issue,
) -> TriageOutcome {
    let photo = &issue.photos[0];
    let mut delay = config.base_delay;
    let mut last_error = String::new();

    for attempt in 1..=config.max_attempts.max(1) {
        let call = client.classify(issue.id, &issue.description, photo);
        match timeout(config.call_timeout, call).await {
            Ok(Ok(result)) => {
                debug!(
                    issue_id = %issue.id,
                    attempt,
                    category = ?result.category,
                    "Triage classified issue"
                );
                return TriageOutcome::Classified(result);
            }
            Ok(Err(err)) => {
                last_error = err.to_string();
            }
            Err(_) => {
                last_error = format!("call timed out after {:?}", config.call_timeout);
            }
        }

        warn!(
            issue_id = %issue.id,
            attempt,
            error = %last_error,
            "Triage attempt failed"
        );

        if attempt < config.max_attempts {
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(config.max_delay);
        }
    }

    TriageOutcome::Fallback {
        attempts: config.max_attempts.max(1),
        last_error,
    }
}
