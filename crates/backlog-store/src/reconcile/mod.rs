//! Reconciliation primitives
//!
//! Every function here runs inside a caller-owned transaction and issues
//! batch statements only: one `IN (...)` select per lookup, one multi-row
//! insert per entity kind, one update per matched row.

pub mod counters;
pub mod matcher;
pub mod parents;
pub mod rows;
pub mod upsert;

pub use counters::maintain_counters;
pub use matcher::{match_epics, match_stories, NaturalKey};
pub use parents::{resolve_parents, ParentResolution};
pub use rows::ResolvedStory;
pub use upsert::{batch_upsert, UpsertResult, Upsertable};

/// Bound-parameter ceiling of the bundled SQLite (SQLITE_MAX_VARIABLE_NUMBER)
pub const MAX_BOUND_PARAMS: usize = 32_766;
