//! Extraction payloads produced by the conversational layer
//!
//! Field names deserialize from camelCase JSON so the API layer can pass
//! the extractor's output straight through.

use crate::keys::StoryKey;
use crate::model::{AcceptanceCriterion, Priority, StoryTask};
use serde::{Deserialize, Serialize};

/// One extracted Epic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicExtraction {
    pub number: u32,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default)]
    pub business_value: Option<String>,
    #[serde(default)]
    pub target_sprint: Option<u32>,
    #[serde(default)]
    pub estimated_story_points: Option<u32>,
    #[serde(default)]
    pub functional_requirement_codes: Option<Vec<String>>,
}

/// One extracted Story, referencing its Epic by number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryExtraction {
    pub epic_number: u32,
    pub story_number: u32,
    pub title: String,
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub story_points: Option<u32>,
    #[serde(default)]
    pub target_sprint: Option<u32>,
    #[serde(default)]
    pub acceptance_criteria: Option<Vec<AcceptanceCriterion>>,
    #[serde(default)]
    pub tasks: Option<Vec<StoryTask>>,
}

impl StoryExtraction {
    pub fn key(&self) -> StoryKey {
        StoryKey::new(self.epic_number, self.story_number)
    }

    /// Priority written to the store; absent means medium
    pub fn effective_priority(&self) -> Priority {
        self.priority.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_deserializes_from_camel_case() {
        let json = r#"{
            "epicNumber": 2,
            "storyNumber": 5,
            "title": "Reset password",
            "asA": "registered user",
            "iWant": "to reset my password",
            "soThat": "I can log in again",
            "storyPoints": 3,
            "acceptanceCriteria": [{"description": "email is sent"}]
        }"#;
        let story: StoryExtraction = serde_json::from_str(json).unwrap();

        assert_eq!(story.key(), StoryKey::new(2, 5));
        assert_eq!(story.story_points, Some(3));
        assert_eq!(story.effective_priority(), Priority::Medium);
        assert_eq!(story.acceptance_criteria.as_ref().map(Vec::len), Some(1));
        assert!(story.tasks.is_none());
    }

    #[test]
    fn test_epic_optional_fields_default() {
        let json = r#"{"number": 1, "title": "Auth", "description": "Login", "priority": "high"}"#;
        let epic: EpicExtraction = serde_json::from_str(json).unwrap();

        assert_eq!(epic.priority, Priority::High);
        assert!(epic.business_value.is_none());
        assert!(epic.functional_requirement_codes.is_none());
    }
}
