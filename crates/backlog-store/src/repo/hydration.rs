//! Row → domain model mapping

use backlog_core::errors::PlanningError;
use backlog_core::model::{Epic, Priority, Session, Story, StoryStatus};
use backlog_core::SessionCounters;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;

pub const SESSION_COLUMNS: &str =
    "id, owner_id, title, total_epics, total_stories, total_story_points, created_at, updated_at";

pub const EPIC_COLUMNS: &str = "id, session_id, number, title, description, priority, \
     business_value, target_sprint, estimated_story_points, functional_requirement_codes, \
     created_at, updated_at, deleted_at";

pub const STORY_COLUMNS: &str = "id, session_id, epic_id, epic_number, story_number, story_key, \
     title, as_a, i_want, so_that, description, status, priority, story_points, target_sprint, \
     acceptance_criteria, tasks, created_at, updated_at, deleted_at";

/// Current time as stored in timestamp columns
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Millisecond timestamp → `DateTime`, `None` outside chrono's range
pub fn millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    let nanos = (ms.rem_euclid(1000) * 1_000_000) as u32;
    DateTime::from_timestamp(ms.div_euclid(1000), nanos)
}

fn timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    millis_to_datetime(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            Box::new(PlanningError::InvalidTimestamp { millis: ms }),
        )
    })
}

fn opt_timestamp(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(idx)? {
        Some(_) => timestamp(row, idx).map(Some),
        None => Ok(None),
    }
}

fn parse_text<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_json<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn session_from_row(row: &Row) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        counters: SessionCounters {
            total_epics: row.get(3)?,
            total_stories: row.get(4)?,
            total_story_points: row.get(5)?,
        },
        created_at: timestamp(row, 6)?,
        updated_at: timestamp(row, 7)?,
    })
}

pub fn epic_from_row(row: &Row) -> rusqlite::Result<Epic> {
    Ok(Epic {
        id: row.get(0)?,
        session_id: row.get(1)?,
        number: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        priority: parse_text::<Priority>(row, 5)?,
        business_value: row.get(6)?,
        target_sprint: row.get(7)?,
        estimated_story_points: row.get(8)?,
        functional_requirement_codes: parse_json(row, 9)?,
        created_at: timestamp(row, 10)?,
        updated_at: timestamp(row, 11)?,
        deleted_at: opt_timestamp(row, 12)?,
    })
}

pub fn story_from_row(row: &Row) -> rusqlite::Result<Story> {
    Ok(Story {
        id: row.get(0)?,
        session_id: row.get(1)?,
        epic_id: row.get(2)?,
        epic_number: row.get(3)?,
        story_number: row.get(4)?,
        story_key: row.get(5)?,
        title: row.get(6)?,
        as_a: row.get(7)?,
        i_want: row.get(8)?,
        so_that: row.get(9)?,
        description: row.get(10)?,
        status: parse_text::<StoryStatus>(row, 11)?,
        priority: parse_text::<Priority>(row, 12)?,
        story_points: row.get(13)?,
        target_sprint: row.get(14)?,
        acceptance_criteria: parse_json(row, 15)?,
        tasks: parse_json(row, 16)?,
        created_at: timestamp(row, 17)?,
        updated_at: timestamp(row, 18)?,
        deleted_at: opt_timestamp(row, 19)?,
    })
}
