// Integration tests for the reconciliation primitives: matcher, batch
// upsert, parent resolution and counter maintenance.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use backlog_core::counters::PassTally;
use backlog_core::policy::WriteRecorder;
use backlog_core::{
    CounterMode, ExErrorKind, NoopReconcileHook, StoryKey, StoryStatus, WriteStep,
};
use backlog_store::reconcile::{
    batch_upsert, maintain_counters, match_epics, match_stories, resolve_parents, ResolvedStory,
};
use backlog_store::PlanningRepo;
use common::{count_rows, create_session, epic, setup_test_db, soft_delete, story};
use std::collections::HashMap;

// ===== Matcher =====

#[test]
fn test_match_epics_finds_active_rows_only() {
    // Given: Two persisted epics, one of them tombstoned
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let tx = conn.transaction().unwrap();
    let upserted = batch_upsert(
        &tx,
        &sid,
        &[epic(1, "Auth"), epic(2, "Billing")],
        &HashMap::new(),
        &NoopReconcileHook,
    )
    .unwrap();
    soft_delete(&tx, "epics", &upserted.ids_by_key[&2]);

    // When: Both numbers plus an unknown one are matched
    let found = match_epics(&tx, &sid, &[1, 2, 3]).unwrap();

    // Then: Only the active epic is found
    assert_eq!(found.len(), 1);
    assert_eq!(found.get(&1), upserted.ids_by_key.get(&1));
}

#[test]
fn test_match_is_scoped_to_session() {
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let other = create_session(&conn);
    let tx = conn.transaction().unwrap();
    batch_upsert(
        &tx,
        &other,
        &[epic(1, "Auth")],
        &HashMap::new(),
        &NoopReconcileHook,
    )
    .unwrap();

    let found = match_epics(&tx, &sid, &[1]).unwrap();

    assert!(found.is_empty(), "Epics of another session must not match");
}

#[test]
fn test_match_with_empty_and_duplicate_keys() {
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let tx = conn.transaction().unwrap();

    assert!(match_stories(&tx, &sid, &[]).unwrap().is_empty());

    let epic_ids = batch_upsert(
        &tx,
        &sid,
        &[epic(1, "Auth")],
        &HashMap::new(),
        &NoopReconcileHook,
    )
    .unwrap()
    .ids_by_key;
    let s = story(1, 1, 3);
    batch_upsert(
        &tx,
        &sid,
        &[ResolvedStory {
            story: &s,
            epic_id: epic_ids[&1].clone(),
        }],
        &HashMap::new(),
        &NoopReconcileHook,
    )
    .unwrap();

    let key = StoryKey::new(1, 1);
    let found = match_stories(&tx, &sid, &[key, key, key]).unwrap();
    assert_eq!(found.len(), 1);
}

// ===== Batch upsert =====

#[test]
fn test_new_rows_use_a_single_insert() {
    // Given: Three new epics
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let tx = conn.transaction().unwrap();
    let recorder = WriteRecorder::new();

    // When: They are upserted with nothing matched
    let result = batch_upsert(
        &tx,
        &sid,
        &[epic(1, "Auth"), epic(2, "Billing"), epic(3, "Search")],
        &HashMap::new(),
        &recorder,
    )
    .unwrap();

    // Then: One multi-row insert and every key gets a distinct id
    assert_eq!(recorder.steps(), vec![WriteStep::InsertEpics { rows: 3 }]);
    assert_eq!(result.inserted, vec![1, 2, 3]);
    assert!(result.updated.is_empty());
    let mut ids: Vec<&String> = result.ids_by_key.values().collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_matched_rows_are_updated_in_place() {
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let tx = conn.transaction().unwrap();
    let first = batch_upsert(
        &tx,
        &sid,
        &[epic(1, "Auth")],
        &HashMap::new(),
        &NoopReconcileHook,
    )
    .unwrap();

    let recorder = WriteRecorder::new();
    let existing = match_epics(&tx, &sid, &[1]).unwrap();
    let second = batch_upsert(
        &tx,
        &sid,
        &[epic(1, "Authentication")],
        &existing,
        &recorder,
    )
    .unwrap();

    assert_eq!(recorder.steps(), vec![WriteStep::UpdateEpic { number: 1 }]);
    assert_eq!(second.ids_by_key, first.ids_by_key);
    assert_eq!(second.updated, vec![1]);
    assert_eq!(count_rows(&tx, "epics"), 1);

    let stored = PlanningRepo::get_epic(&tx, &first.ids_by_key[&1])
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Authentication");
}

#[test]
fn test_nothing_to_insert_issues_no_insert() {
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let tx = conn.transaction().unwrap();
    let recorder = WriteRecorder::new();

    let result = batch_upsert::<backlog_core::EpicExtraction>(
        &tx,
        &sid,
        &[],
        &HashMap::new(),
        &recorder,
    )
    .unwrap();

    assert!(recorder.steps().is_empty());
    assert!(result.ids_by_key.is_empty());
}

#[test]
fn test_duplicate_rows_collapse_last_value_wins() {
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let tx = conn.transaction().unwrap();

    let result = batch_upsert(
        &tx,
        &sid,
        &[epic(1, "Draft"), epic(2, "Billing"), epic(1, "Final")],
        &HashMap::new(),
        &NoopReconcileHook,
    )
    .unwrap();

    assert_eq!(result.inserted, vec![1, 2]);
    let stored = PlanningRepo::list_epics(&tx, &sid).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].title, "Final");
}

#[test]
fn test_story_insert_and_update_keep_status() {
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let tx = conn.transaction().unwrap();
    let epic_ids = batch_upsert(
        &tx,
        &sid,
        &[epic(1, "Auth")],
        &HashMap::new(),
        &NoopReconcileHook,
    )
    .unwrap()
    .ids_by_key;
    let s = story(1, 1, 3);
    let rows = [ResolvedStory {
        story: &s,
        epic_id: epic_ids[&1].clone(),
    }];
    let inserted = batch_upsert(&tx, &sid, &rows, &HashMap::new(), &NoopReconcileHook).unwrap();
    let story_id = inserted.ids_by_key[&StoryKey::new(1, 1)].clone();

    // A status change made outside reconciliation survives the next update
    tx.execute(
        "UPDATE stories SET status = 'in_progress' WHERE id = ?",
        [&story_id],
    )
    .unwrap();
    let mut revised = story(1, 1, 8);
    revised.title = "Pay with saved card".to_string();
    let rows = [ResolvedStory {
        story: &revised,
        epic_id: epic_ids[&1].clone(),
    }];
    let existing = match_stories(&tx, &sid, &[StoryKey::new(1, 1)]).unwrap();
    batch_upsert(&tx, &sid, &rows, &existing, &NoopReconcileHook).unwrap();

    let stored = PlanningRepo::get_story(&tx, &story_id).unwrap().unwrap();
    assert_eq!(stored.status, StoryStatus::InProgress);
    assert_eq!(stored.story_points, Some(8));
    assert_eq!(stored.title, "Pay with saved card");
    assert_eq!(stored.story_key, "1-1");
    assert!(stored.key_is_consistent());
}

// ===== Parent resolution =====

#[test]
fn test_parents_fall_back_to_persisted_epics() {
    // Given: Epic 1 persisted earlier, epic 2 reconciled in this call
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let tx = conn.transaction().unwrap();
    let persisted = batch_upsert(
        &tx,
        &sid,
        &[epic(1, "Auth")],
        &HashMap::new(),
        &NoopReconcileHook,
    )
    .unwrap();
    let mut epic_ids: HashMap<u32, String> = HashMap::new();
    epic_ids.insert(2, "in-call-epic".to_string());

    // When: Stories under epics 1, 2 and 9 are resolved
    let stories = [story(1, 1, 1), story(2, 1, 2), story(9, 1, 3)];
    let refs: Vec<_> = stories.iter().collect();
    let resolution = resolve_parents(&tx, &sid, &refs, &mut epic_ids).unwrap();

    // Then: 1 comes from the store, 2 from the call, 9 is an orphan
    assert_eq!(resolution.resolved.len(), 2);
    assert_eq!(resolution.resolved[0].epic_id, persisted.ids_by_key[&1]);
    assert_eq!(resolution.resolved[1].epic_id, "in-call-epic");
    assert_eq!(resolution.orphans.len(), 1);
    assert_eq!(resolution.orphans[0].key(), StoryKey::new(9, 1));
    assert_eq!(epic_ids.get(&1), persisted.ids_by_key.get(&1));
}

#[test]
fn test_tombstoned_parent_is_not_resolved() {
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let tx = conn.transaction().unwrap();
    let persisted = batch_upsert(
        &tx,
        &sid,
        &[epic(1, "Auth")],
        &HashMap::new(),
        &NoopReconcileHook,
    )
    .unwrap();
    soft_delete(&tx, "epics", &persisted.ids_by_key[&1]);

    let stories = [story(1, 1, 1)];
    let refs: Vec<_> = stories.iter().collect();
    let resolution = resolve_parents(&tx, &sid, &refs, &mut HashMap::new()).unwrap();

    assert!(resolution.resolved.is_empty());
    assert_eq!(resolution.orphans.len(), 1);
}

// ===== Counters =====

#[test]
fn test_counters_replace_and_increment() {
    let mut conn = setup_test_db();
    let sid = create_session(&conn);
    let tx = conn.transaction().unwrap();
    let tally = PassTally {
        epics_reconciled: 2,
        stories_reconciled: 5,
        story_points_reconciled: 18,
        epics_inserted: 1,
        stories_inserted: 2,
        story_points_inserted: 5,
    };

    let replaced =
        maintain_counters(&tx, &sid, CounterMode::Replace, &tally, &NoopReconcileHook).unwrap();
    assert_eq!(
        (replaced.total_epics, replaced.total_stories, replaced.total_story_points),
        (2, 5, 18)
    );

    let incremented =
        maintain_counters(&tx, &sid, CounterMode::Increment, &tally, &NoopReconcileHook).unwrap();
    assert_eq!(
        (
            incremented.total_epics,
            incremented.total_stories,
            incremented.total_story_points
        ),
        (3, 7, 23)
    );
    assert_eq!(
        PlanningRepo::get_counters(&tx, &sid).unwrap(),
        Some(incremented)
    );
}

#[test]
fn test_counters_for_missing_session_is_not_found() {
    let mut conn = setup_test_db();
    let tx = conn.transaction().unwrap();

    let err = maintain_counters(
        &tx,
        "no-such-session",
        CounterMode::Replace,
        &PassTally::default(),
        &NoopReconcileHook,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.session_id(), Some("no-such-session"));
}
