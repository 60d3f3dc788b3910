#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use backlog_core::{EpicExtraction, Priority, StoryExtraction};
use backlog_store::{db, migrations, PlanningRepo};
use rusqlite::Connection;

/// Fresh in-memory database with the schema applied
pub fn setup_test_db() -> Connection {
    let mut conn = db::open_in_memory().expect("Failed to create in-memory database");
    migrations::apply_migrations(&mut conn).expect("Failed to apply migrations");
    conn
}

pub fn create_session(conn: &Connection) -> String {
    PlanningRepo::create_session(conn, "owner-1", "Checkout revamp")
        .expect("Failed to create session")
        .id
}

pub fn epic(number: u32, title: &str) -> EpicExtraction {
    EpicExtraction {
        number,
        title: title.to_string(),
        description: format!("{} description", title),
        priority: Priority::High,
        business_value: None,
        target_sprint: None,
        estimated_story_points: None,
        functional_requirement_codes: None,
    }
}

pub fn story(epic_number: u32, story_number: u32, points: u32) -> StoryExtraction {
    StoryExtraction {
        epic_number,
        story_number,
        title: format!("Story {}-{}", epic_number, story_number),
        as_a: "shopper".to_string(),
        i_want: "to pay with a saved card".to_string(),
        so_that: "checkout is faster".to_string(),
        description: None,
        priority: None,
        story_points: Some(points),
        target_sprint: None,
        acceptance_criteria: None,
        tasks: None,
    }
}

pub fn soft_delete(conn: &Connection, table: &str, id: &str) {
    conn.execute(
        &format!("UPDATE {} SET deleted_at = 1 WHERE id = ?", table),
        [id],
    )
    .expect("Failed to soft delete");
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .expect("Failed to count rows")
}
