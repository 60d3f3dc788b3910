//! Column bindings for epic and story rows

use crate::errors::{json_error, sqlite_op, Result};
use crate::reconcile::upsert::Upsertable;
use backlog_core::errors::{ExError, ExErrorKind};
use backlog_core::model::StoryStatus;
use backlog_core::{EpicExtraction, StoryExtraction, StoryKey, WriteStep};
use rusqlite::types::Value;
use rusqlite::Transaction;
use serde::Serialize;

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn opt_text(s: Option<&String>) -> Value {
    s.map_or(Value::Null, |s| Value::Text(s.clone()))
}

fn int(n: u32) -> Value {
    Value::Integer(i64::from(n))
}

fn opt_int(n: Option<u32>) -> Value {
    n.map_or(Value::Null, int)
}

/// JSON array column; absent lists are stored as `[]`
fn json_list<T: Serialize>(items: Option<&Vec<T>>, op: &str) -> Result<Value> {
    let encoded = match items {
        Some(items) => serde_json::to_string(items).map_err(|e| json_error(op, e))?,
        None => "[]".to_string(),
    };
    Ok(Value::Text(encoded))
}

fn expect_one_row(changed: usize, table: &str, id: &str) -> Result<()> {
    if changed != 1 {
        return Err(ExError::new(ExErrorKind::Concurrency)
            .with_op("update_row")
            .with_entity_id(id)
            .with_message(format!(
                "matched {} row vanished or was tombstoned before its update",
                table
            )));
    }
    Ok(())
}

impl Upsertable for EpicExtraction {
    type Key = u32;

    const INSERT_COLUMNS: &'static [&'static str] = &[
        "session_id",
        "number",
        "title",
        "description",
        "priority",
        "business_value",
        "target_sprint",
        "estimated_story_points",
        "functional_requirement_codes",
        "created_at",
        "updated_at",
    ];

    fn natural_key(&self) -> u32 {
        self.number
    }

    fn insert_values(&self, session_id: &str, now: i64) -> Result<Vec<Value>> {
        Ok(vec![
            text(session_id),
            int(self.number),
            text(&self.title),
            text(&self.description),
            text(self.priority.as_str()),
            opt_text(self.business_value.as_ref()),
            opt_int(self.target_sprint),
            opt_int(self.estimated_story_points),
            json_list(self.functional_requirement_codes.as_ref(), "insert_epics")?,
            Value::Integer(now),
            Value::Integer(now),
        ])
    }

    fn update(&self, tx: &Transaction, id: &str, now: i64) -> Result<()> {
        let changed = tx
            .execute(
                "UPDATE epics SET
                    title = ?1,
                    description = ?2,
                    priority = ?3,
                    business_value = ?4,
                    target_sprint = ?5,
                    estimated_story_points = ?6,
                    functional_requirement_codes = ?7,
                    updated_at = ?8
                 WHERE id = ?9 AND deleted_at IS NULL",
                rusqlite::params![
                    self.title,
                    self.description,
                    self.priority.as_str(),
                    self.business_value,
                    self.target_sprint,
                    self.estimated_story_points,
                    json_list(self.functional_requirement_codes.as_ref(), "update_epic")?,
                    now,
                    id,
                ],
            )
            .map_err(|e| sqlite_op("update_epic")(e).with_entity_id(self.number.to_string()))?;
        expect_one_row(changed, "epics", id)
    }

    fn insert_step(rows: usize) -> WriteStep {
        WriteStep::InsertEpics { rows }
    }

    fn update_step(number: u32) -> WriteStep {
        WriteStep::UpdateEpic { number }
    }
}

/// A story whose parent epic has been resolved to a persisted id
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStory<'a> {
    pub story: &'a StoryExtraction,
    pub epic_id: String,
}

impl Upsertable for ResolvedStory<'_> {
    type Key = StoryKey;

    const INSERT_COLUMNS: &'static [&'static str] = &[
        "session_id",
        "epic_id",
        "epic_number",
        "story_number",
        "story_key",
        "title",
        "as_a",
        "i_want",
        "so_that",
        "description",
        "status",
        "priority",
        "story_points",
        "target_sprint",
        "acceptance_criteria",
        "tasks",
        "created_at",
        "updated_at",
    ];

    fn natural_key(&self) -> StoryKey {
        self.story.key()
    }

    fn insert_values(&self, session_id: &str, now: i64) -> Result<Vec<Value>> {
        let s = self.story;
        Ok(vec![
            text(session_id),
            text(&self.epic_id),
            int(s.epic_number),
            int(s.story_number),
            Value::Text(s.key().to_string()),
            text(&s.title),
            text(&s.as_a),
            text(&s.i_want),
            text(&s.so_that),
            opt_text(s.description.as_ref()),
            text(StoryStatus::Backlog.as_str()),
            text(s.effective_priority().as_str()),
            opt_int(s.story_points),
            opt_int(s.target_sprint),
            json_list(s.acceptance_criteria.as_ref(), "insert_stories")?,
            json_list(s.tasks.as_ref(), "insert_stories")?,
            Value::Integer(now),
            Value::Integer(now),
        ])
    }

    /// Status is left alone: the extraction payload does not carry it.
    fn update(&self, tx: &Transaction, id: &str, now: i64) -> Result<()> {
        let s = self.story;
        let changed = tx
            .execute(
                "UPDATE stories SET
                    epic_id = ?1,
                    story_key = ?2,
                    title = ?3,
                    as_a = ?4,
                    i_want = ?5,
                    so_that = ?6,
                    description = ?7,
                    priority = ?8,
                    story_points = ?9,
                    target_sprint = ?10,
                    acceptance_criteria = ?11,
                    tasks = ?12,
                    updated_at = ?13
                 WHERE id = ?14 AND deleted_at IS NULL",
                rusqlite::params![
                    self.epic_id,
                    s.key().to_string(),
                    s.title,
                    s.as_a,
                    s.i_want,
                    s.so_that,
                    s.description,
                    s.effective_priority().as_str(),
                    s.story_points,
                    s.target_sprint,
                    json_list(s.acceptance_criteria.as_ref(), "update_story")?,
                    json_list(s.tasks.as_ref(), "update_story")?,
                    now,
                    id,
                ],
            )
            .map_err(|e| sqlite_op("update_story")(e).with_entity_id(s.key().to_string()))?;
        expect_one_row(changed, "stories", id)
    }

    fn insert_step(rows: usize) -> WriteStep {
        WriteStep::InsertStories { rows }
    }

    fn update_step(key: StoryKey) -> WriteStep {
        WriteStep::UpdateStory { key }
    }
}
