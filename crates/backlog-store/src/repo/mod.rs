//! Read-side repository for planning sessions
//!
//! The reconciliation engine owns all epic/story writes; this module only
//! creates sessions and reads rows back.

pub mod hydration;
pub mod planning_repo;

pub use planning_repo::PlanningRepo;
