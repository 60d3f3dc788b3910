//! Backlog Core - domain model for AI-extracted planning data
//!
//! This crate provides the pieces of the reconciliation engine that do not
//! touch storage:
//! - Session, Epic and Story models with their enumerations and sub-documents
//! - Extraction payloads as handed over by the conversational layer
//! - Natural keys and in-payload deduplication
//! - Payload validation (bounded lengths, positive numbers)
//! - Counter maintenance modes and write hooks
//! - Error facility (`ExError`) and logging facility

pub mod counters;
pub mod errors;
pub mod extraction;
pub mod keys;
pub mod logging_facility;
pub mod model;
pub mod policy;
pub mod rules;

pub use backlog_core_types::schema;

// Re-export commonly used types
pub use counters::{CounterMode, SessionCounters};
pub use errors::{ExError, ExErrorKind, PlanningError, Result};
pub use extraction::{EpicExtraction, StoryExtraction};
pub use keys::StoryKey;
pub use model::{AcceptanceCriterion, Epic, Priority, Session, Story, StoryStatus, StoryTask};
pub use policy::{NoopReconcileHook, ReconcileHook, WriteStep};
