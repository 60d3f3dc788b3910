use crate::model::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A grouping of related Stories within a Session
///
/// Natural key is `(session_id, number)`. `id` is assigned by the store on
/// first insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: String,
    pub session_id: String,
    pub number: u32,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub business_value: Option<String>,
    pub target_sprint: Option<u32>,
    pub estimated_story_points: Option<u32>,
    pub functional_requirement_codes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Tombstone; a deleted epic never matches its natural key again
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Epic {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
