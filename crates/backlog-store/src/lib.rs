//! Backlog Store - SQLite persistence for planning sessions
//!
//! Provides:
//! - Connection management and embedded migrations
//! - Read repository for sessions, epics and stories
//! - Reconciliation primitives: natural-key matching, batch upsert,
//!   parent resolution and counter maintenance

pub mod db;
pub mod errors;
pub mod migrations;
pub mod reconcile;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use repo::PlanningRepo;
