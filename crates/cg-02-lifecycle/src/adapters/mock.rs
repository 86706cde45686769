//! # Mock Collaborator Adapters
//!
//! In-process stand-ins for the external collaborators: a scriptable triage
//! classifier, a recording notification dispatcher, a static identity
//! provider, and a reference-minting media store.

use crate::ports::outbound::{
    IdentityProvider, MediaStore, NotificationDispatcher, TriageClient, TriageResult,
};
use async_trait::async_trait;
use shared_types::entities::{Actor, IssueId, IssueStatus, MediaRef, UserId};
use shared_types::errors::CoreError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::info;

/// Canned behavior for the mock classifier.
enum TriageMode {
    /// Classify every call with the same result.
    Always(TriageResult),
    /// Fail every call with an upstream error.
    Failing(String),
    /// Never answer; the call pends until cancelled or timed out.
    Stalled,
}

/// Triage client with scripted behavior.
pub struct MockTriageClient {
    mode: TriageMode,
    calls: AtomicU32,
}

impl MockTriageClient {
    /// Always classify with the given result.
    #[must_use]
    pub fn always(result: TriageResult) -> Self {
        Self {
            mode: TriageMode::Always(result),
            calls: AtomicU32::new(0),
        }
    }

    /// Fail every call with an upstream error.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            mode: TriageMode::Failing(message.to_string()),
            calls: AtomicU32::new(0),
        }
    }

    /// Never answer. Useful when a test wants full control over when (or
    /// whether) classification lands.
    #[must_use]
    pub fn stalled() -> Self {
        Self {
            mode: TriageMode::Stalled,
            calls: AtomicU32::new(0),
        }
    }

    /// Number of classification calls made so far.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TriageClient for MockTriageClient {
    async fn classify(
        &self,
        _issue_id: IssueId,
        _description: &str,
        _photo: &MediaRef,
    ) -> Result<TriageResult, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            TriageMode::Always(result) => Ok(result.clone()),
            TriageMode::Failing(message) => Err(CoreError::Upstream(message.clone())),
            TriageMode::Stalled => std::future::pending().await,
        }
    }
}

/// Dispatcher that records every delivery attempt.
#[derive(Default)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<(UserId, IssueId, IssueStatus)>>,
    fail: bool,
}

impl RecordingDispatcher {
    /// Dispatcher whose deliveries all succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher whose deliveries all fail (attempts still recorded).
    #[must_use]
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Snapshot of recorded deliveries in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<(UserId, IssueId, IssueStatus)> {
        self.calls
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify(
        &self,
        user_id: UserId,
        issue_id: IssueId,
        new_status: IssueStatus,
    ) -> Result<(), CoreError> {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push((user_id, issue_id, new_status));
        }
        if self.fail {
            return Err(CoreError::Upstream("push gateway unavailable".to_string()));
        }
        info!(user = %user_id, issue = %issue_id, status = %new_status, "Notification sent");
        Ok(())
    }
}

/// Identity provider over a fixed token table.
#[derive(Default)]
pub struct StaticIdentityProvider {
    tokens: HashMap<String, Actor>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for an actor.
    #[must_use]
    pub fn with_token(mut self, token: &str, actor: Actor) -> Self {
        self.tokens.insert(token.to_string(), actor);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Actor, CoreError> {
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| CoreError::Upstream(format!("unknown token '{token}'")))
    }
}

/// Media store that discards the bytes and mints sequential references.
#[derive(Default)]
pub struct InMemoryMediaStore {
    uploads: AtomicU64,
}

impl InMemoryMediaStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of uploads accepted.
    #[must_use]
    pub fn uploads(&self) -> u64 {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn upload(&self, bytes: &[u8], content_type: &str) -> Result<MediaRef, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::Upstream("empty upload".to_string()));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MediaRef(format!("media://{content_type}/{n}")))
    }
}
