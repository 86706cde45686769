//! Lifecycle service layer: request orchestration, the triage retry loop,
//! and the notification worker.

pub mod lifecycle;
pub mod notify;
pub mod triage;

pub use lifecycle::LifecycleService;
pub use notify::NotificationWorker;
pub use triage::TriageConfig;
