//! # cg-02-lifecycle
//!
//! Lifecycle subsystem for CivicGrid.
//!
//! ## Role in System
//!
//! - **Orchestrator**: `submit_issue` and `transition_status` are the only
//!   paths that mutate issue records
//! - **Role Gate**: capability checks run before transition legality, so an
//!   unauthorized caller never learns whether their transition was otherwise
//!   legal
//! - **Transition Validator**: pure edge + field checks over the status
//!   graph; structurally valid but field-incomplete requests are rejected
//!   atomically
//! - **Triage Driver**: requests classification from the external AI
//!   collaborator with bounded exponential backoff, applying results through
//!   the same compare-and-set discipline as human edits
//!
//! ## Choreography Flow
//!
//! ```text
//! [Client] ──submit/transition──→ [Lifecycle (2)] ──CAS──→ [Issue Store (1)]
//!                                      │                        │
//!                                 TriageClient            IssueUpserted
//!                                      │                        ▼
//!                                 [AI collaborator]        [Event Bus]
//!                                                               │
//!                                              Assigned/Resolved upserts
//!                                                               ▼
//!                                                      [Notification worker]
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::role_gate::Action;
pub use domain::transitions::TransitionFields;
pub use ports::inbound::{LifecycleApi, SubmitIssue, TransitionRequest};
pub use ports::outbound::{
    IdentityProvider, MediaStore, NotificationDispatcher, TriageClient, TriageResult,
};
pub use service::lifecycle::LifecycleService;
pub use service::notify::NotificationWorker;
pub use service::triage::TriageConfig;
