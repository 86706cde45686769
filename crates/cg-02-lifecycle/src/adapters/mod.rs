//! Adapters for the outbound collaborator ports.
//!
//! Real deployments substitute HTTP/queue-backed implementations; the mocks
//! here back tests and the single-node demo runtime.

pub mod mock;
