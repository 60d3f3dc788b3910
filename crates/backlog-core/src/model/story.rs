use crate::keys::StoryKey;
use crate::model::{Priority, StoryStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One acceptance criterion of a Story
///
/// Sub-documents are not reconciled individually: the whole list is
/// replaced on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceCriterion {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<String>,
}

/// Implementation task attached to a Story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub done: bool,
}

/// A user story belonging to exactly one Epic
///
/// Natural key is `(session_id, epic_number, story_number)`; `story_key` is
/// always `"{epic_number}-{story_number}"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub session_id: String,
    pub epic_id: String,
    pub epic_number: u32,
    pub story_number: u32,
    pub story_key: String,
    pub title: String,
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
    pub description: Option<String>,
    pub status: StoryStatus,
    pub priority: Priority,
    pub story_points: Option<u32>,
    pub target_sprint: Option<u32>,
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    pub tasks: Vec<StoryTask>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Story {
    pub fn key(&self) -> StoryKey {
        StoryKey::new(self.epic_number, self.story_number)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the stored display key agrees with the numeric parts
    pub fn key_is_consistent(&self) -> bool {
        self.story_key == self.key().to_string()
    }
}
