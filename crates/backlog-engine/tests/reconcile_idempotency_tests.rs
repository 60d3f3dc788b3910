// Re-running the same payload converges instead of duplicating rows

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use backlog_core::{CounterMode, NoopReconcileHook};
use backlog_engine::reconcile;
use common::{count_rows, create_session, epic, request, setup_test_db, story};

#[test]
fn test_same_payload_twice_is_idempotent() {
    // Given: A session and a full extraction
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let req = request(
        &sid,
        vec![epic(1, "Listings"), epic(2, "Payments")],
        vec![
            story(1, 1, 3),
            story(1, 2, 5),
            story(2, 1, 8),
            story(2, 2, 1),
            story(2, 3, 2),
        ],
        CounterMode::Replace,
    );

    // When: It is reconciled twice
    let first = reconcile(&mut conn, &req, &NoopReconcileHook).unwrap();
    let epics_after_first = count_rows(&conn, "epics");
    let stories_after_first = count_rows(&conn, "stories");
    let second = reconcile(&mut conn, &req, &NoopReconcileHook).unwrap();

    // Then: Same rows, same ids, same counters
    assert_eq!(count_rows(&conn, "epics"), epics_after_first);
    assert_eq!(count_rows(&conn, "stories"), stories_after_first);
    assert_eq!(epics_after_first, 2);
    assert_eq!(stories_after_first, 5);
    assert_eq!(second.epic_ids_by_number, first.epic_ids_by_number);
    assert_eq!(second.story_ids_by_key, first.story_ids_by_key);
    assert_eq!(second.session, first.session);

    assert_eq!(second.epics_inserted, 0);
    assert_eq!(second.epics_updated, 2);
    assert_eq!(second.stories_inserted, 0);
    assert_eq!(second.stories_updated, 5);
}

#[test]
fn test_rerun_in_increment_mode_adds_nothing() {
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let req = request(
        &sid,
        vec![epic(1, "Listings")],
        vec![story(1, 1, 3), story(1, 2, 5)],
        CounterMode::Increment,
    );

    let first = reconcile(&mut conn, &req, &NoopReconcileHook).unwrap();
    let second = reconcile(&mut conn, &req, &NoopReconcileHook).unwrap();

    assert_eq!(first.session.total_stories, 2);
    assert_eq!(first.session.total_story_points, 8);
    assert_eq!(second.session, first.session);
}

#[test]
fn test_separate_sessions_do_not_share_rows() {
    let mut conn = setup_test_db();
    let a = create_session(&conn);
    let b = create_session(&conn);
    let payload = |sid: &str| {
        request(
            sid,
            vec![epic(1, "Listings")],
            vec![story(1, 1, 3)],
            CounterMode::Replace,
        )
    };

    let first = reconcile(&mut conn, &payload(&a), &NoopReconcileHook).unwrap();
    let second = reconcile(&mut conn, &payload(&b), &NoopReconcileHook).unwrap();

    assert_eq!(second.epics_inserted, 1);
    assert_ne!(second.epic_ids_by_number[&1], first.epic_ids_by_number[&1]);
    assert_eq!(count_rows(&conn, "epics"), 2);
}
