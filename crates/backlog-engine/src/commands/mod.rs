//! Command orchestration layer.
//!
//! Coordinates payload validation, the store's reconciliation primitives
//! and transaction boundaries.

pub mod engine_command;
pub mod reconcile;
