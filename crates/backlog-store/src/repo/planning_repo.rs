//! SQLite repository for sessions and their backlog

use crate::errors::{sqlite_op, Result};
use crate::repo::hydration::{
    epic_from_row, now_millis, session_from_row, story_from_row, EPIC_COLUMNS, SESSION_COLUMNS,
    STORY_COLUMNS,
};
use backlog_core::model::{Epic, Session, Story};
use backlog_core::SessionCounters;
use rusqlite::{Connection, OptionalExtension};

/// SQLite repository for planning sessions
pub struct PlanningRepo;

impl PlanningRepo {
    /// Create an empty session and return it with its generated id
    pub fn create_session(conn: &Connection, owner_id: &str, title: &str) -> Result<Session> {
        let now = now_millis();
        let sql = format!(
            "INSERT INTO sessions (owner_id, title, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             RETURNING {}",
            SESSION_COLUMNS
        );
        let session = conn
            .query_row(&sql, rusqlite::params![owner_id, title, now], session_from_row)
            .map_err(sqlite_op("create_session"))?;

        tracing::debug!(session_id = %session.id, owner_id, "Created session");

        Ok(session)
    }

    /// Get a session by id
    pub fn get_session(conn: &Connection, session_id: &str) -> Result<Option<Session>> {
        let sql = format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLUMNS);
        conn.query_row(&sql, [session_id], session_from_row)
            .optional()
            .map_err(sqlite_op("get_session"))
    }

    /// Get only the aggregate counters of a session
    pub fn get_counters(conn: &Connection, session_id: &str) -> Result<Option<SessionCounters>> {
        conn.query_row(
            "SELECT total_epics, total_stories, total_story_points FROM sessions WHERE id = ?1",
            [session_id],
            |row| {
                Ok(SessionCounters {
                    total_epics: row.get(0)?,
                    total_stories: row.get(1)?,
                    total_story_points: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(sqlite_op("get_counters"))
    }

    /// Active epics of a session, ordered by number
    pub fn list_epics(conn: &Connection, session_id: &str) -> Result<Vec<Epic>> {
        let sql = format!(
            "SELECT {} FROM epics
             WHERE session_id = ?1 AND deleted_at IS NULL
             ORDER BY number, rowid",
            EPIC_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(sqlite_op("list_epics"))?;
        let epics = stmt
            .query_map([session_id], epic_from_row)
            .map_err(sqlite_op("list_epics"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(sqlite_op("list_epics"))?;
        Ok(epics)
    }

    /// Active stories of a session, ordered by epic number then story number
    pub fn list_stories(conn: &Connection, session_id: &str) -> Result<Vec<Story>> {
        let sql = format!(
            "SELECT {} FROM stories
             WHERE session_id = ?1 AND deleted_at IS NULL
             ORDER BY epic_number, story_number, rowid",
            STORY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(sqlite_op("list_stories"))?;
        let stories = stmt
            .query_map([session_id], story_from_row)
            .map_err(sqlite_op("list_stories"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(sqlite_op("list_stories"))?;
        Ok(stories)
    }

    /// Get an epic by surrogate id, tombstoned or not
    pub fn get_epic(conn: &Connection, epic_id: &str) -> Result<Option<Epic>> {
        let sql = format!("SELECT {} FROM epics WHERE id = ?1", EPIC_COLUMNS);
        conn.query_row(&sql, [epic_id], epic_from_row)
            .optional()
            .map_err(sqlite_op("get_epic"))
    }

    /// Get a story by surrogate id, tombstoned or not
    pub fn get_story(conn: &Connection, story_id: &str) -> Result<Option<Story>> {
        let sql = format!("SELECT {} FROM stories WHERE id = ?1", STORY_COLUMNS);
        conn.query_row(&sql, [story_id], story_from_row)
            .optional()
            .map_err(sqlite_op("get_story"))
    }
}
