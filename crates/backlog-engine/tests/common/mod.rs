#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use backlog_core::{CounterMode, EpicExtraction, Priority, StoryExtraction};
use backlog_engine::ReconcileRequest;
use backlog_store::{db, migrations, PlanningRepo};
use rusqlite::types::Value;
use rusqlite::Connection;

pub fn setup_test_db() -> Connection {
    let mut conn = db::open_in_memory().expect("Failed to create in-memory database");
    migrations::apply_migrations(&mut conn).expect("Failed to apply migrations");
    conn
}

pub fn create_session(conn: &Connection) -> String {
    PlanningRepo::create_session(conn, "owner-1", "Marketplace MVP")
        .expect("Failed to create session")
        .id
}

pub fn epic(number: u32, title: &str) -> EpicExtraction {
    EpicExtraction {
        number,
        title: title.to_string(),
        description: format!("All work on {}", title.to_lowercase()),
        priority: Priority::High,
        business_value: Some("Unblocks launch".to_string()),
        target_sprint: Some(1),
        estimated_story_points: None,
        functional_requirement_codes: None,
    }
}

pub fn story(epic_number: u32, story_number: u32, points: u32) -> StoryExtraction {
    StoryExtraction {
        epic_number,
        story_number,
        title: format!("Story {}-{}", epic_number, story_number),
        as_a: "seller".to_string(),
        i_want: "to list an item".to_string(),
        so_that: "buyers can find it".to_string(),
        description: None,
        priority: None,
        story_points: Some(points),
        target_sprint: None,
        acceptance_criteria: None,
        tasks: None,
    }
}

pub fn request(
    session_id: &str,
    epics: Vec<EpicExtraction>,
    stories: Vec<StoryExtraction>,
    mode: CounterMode,
) -> ReconcileRequest {
    ReconcileRequest::new(session_id, epics, stories, mode)
}

/// Every row of every planning table, rendered for equality checks
pub fn dump_tables(conn: &Connection) -> Vec<String> {
    let mut dump = Vec::new();
    for table in ["sessions", "epics", "stories"] {
        let mut stmt = conn
            .prepare(&format!("SELECT * FROM {} ORDER BY rowid", table))
            .unwrap();
        let columns = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..columns)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })
            .unwrap();
        for row in rows {
            dump.push(format!("{}: {:?}", table, row.unwrap()));
        }
    }
    dump
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

pub fn soft_delete(conn: &Connection, table: &str, id: &str) {
    conn.execute(
        &format!("UPDATE {} SET deleted_at = 1 WHERE id = ?", table),
        [id],
    )
    .unwrap();
}
