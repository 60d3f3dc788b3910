//! Persisted planning entities

pub mod epic;
pub mod priority;
pub mod session;
pub mod story;

pub use epic::Epic;
pub use priority::{Priority, StoryStatus};
pub use session::Session;
pub use story::{AcceptanceCriterion, Story, StoryTask};
