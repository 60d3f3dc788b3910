//! Payload rules checked before any write

pub mod validation;

pub use validation::{validate_epics, validate_stories};
