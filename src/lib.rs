//! # cihub-cli
//!
//! Client for the DevOps Intelligence Hub estimation service. Collects
//! deployment parameters, submits them to the remote estimator, renders the
//! returned cost/risk assessment, and keeps a bounded, persisted history of
//! past runs that can be recalled without re-querying the service.

/// Command-line surface and output dispatch
pub mod cli;

/// HTTP exchange against the remote estimator
pub mod engine;

/// Bounded, persisted run history
pub mod history;

/// Request/response types, form coercion, history entries
pub mod model;

/// Session controller: estimate lifecycle and history recall
pub mod orchestrator;

/// Explicit session state container
pub mod state;

/// Key/value persistence backends
pub mod storage;

/// Text rendering for reports and listings
pub mod text_summary;
