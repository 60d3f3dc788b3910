//! Backlog Engine - reconciliation orchestration
//!
//! Merges extracted Epics and Stories into a planning session inside one
//! transaction and maintains the session's aggregate counters.

pub mod commands;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::reconcile::{reconcile, reconcile_in_tx, ReconcileOutcome, ReconcileRequest};
