// Structured log events emitted by a reconciliation pass

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use backlog_core::logging_facility::test_capture::init_test_capture;
use backlog_core::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_ERR_CODE, FIELD_SESSION_ID, FIELD_SKIPPED,
    FIELD_STORY_KEY, FIELD_TRACE_ID,
};
use backlog_core::{CounterMode, NoopReconcileHook};
use backlog_core_types::{RequestContext, TraceId};
use backlog_engine::reconcile;
use common::{create_session, epic, request, setup_test_db, story};
use tracing::Level;

#[test]
fn test_reconcile_logs_start_and_end() {
    let capture = init_test_capture();
    let mut conn = setup_test_db();
    let sid = create_session(&conn);

    reconcile(
        &mut conn,
        &request(
            &sid,
            vec![epic(1, "Listings")],
            vec![story(1, 1, 1), story(5, 1, 1)],
            CounterMode::Replace,
        ),
        &NoopReconcileHook,
    )
    .unwrap();

    let events: Vec<_> = capture
        .events_for_op("reconcile")
        .into_iter()
        .filter(|e| e.field(FIELD_SESSION_ID) == Some(sid.as_str()))
        .collect();
    let kinds: Vec<_> = events.iter().map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![Some(EVENT_START), Some(EVENT_END)]);
    assert_eq!(events[1].field(FIELD_SKIPPED), Some("1"));
    assert!(events[1].field("duration_ms").is_some());
}

#[test]
fn test_orphan_is_logged_at_warn() {
    let capture = init_test_capture();
    let mut conn = setup_test_db();
    let sid = create_session(&conn);

    reconcile(
        &mut conn,
        &request(&sid, vec![], vec![story(7, 2, 1)], CounterMode::Replace),
        &NoopReconcileHook,
    )
    .unwrap();

    let warnings = capture.count_events(|e| {
        e.level == Level::WARN
            && e.field(FIELD_SESSION_ID) == Some(sid.as_str())
            && e.field(FIELD_STORY_KEY) == Some("7-2")
    });
    assert_eq!(warnings, 1);
}

#[test]
fn test_failed_pass_logs_error_with_request_id() {
    let capture = init_test_capture();
    let mut conn = setup_test_db();
    let context = RequestContext::new();
    let request_id = context.request_id.clone();
    let req = request("ghost-session", vec![], vec![], CounterMode::Replace).with_context(context);

    let err = reconcile(&mut conn, &req, &NoopReconcileHook).unwrap_err();
    assert_eq!(err.request_id(), Some(&request_id));

    let errors: Vec<_> = capture
        .events_for_op("reconcile")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .filter(|e| e.field("request_id") == Some(request_id.as_str()))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_NOT_FOUND"));
    assert_eq!(errors[0].field(FIELD_SESSION_ID), Some("ghost-session"));
}

#[test]
fn test_trace_id_reaches_logs_and_error() {
    let capture = init_test_capture();
    let mut conn = setup_test_db();
    let trace_id = TraceId::new();
    let context = RequestContext::new().with_trace_id(trace_id.clone());
    let req = request("ghost-traced", vec![], vec![], CounterMode::Replace).with_context(context);

    let err = reconcile(&mut conn, &req, &NoopReconcileHook).unwrap_err();
    assert_eq!(err.trace_id(), Some(&trace_id));

    let events: Vec<_> = capture
        .events_for_op("reconcile")
        .into_iter()
        .filter(|e| e.field(FIELD_TRACE_ID) == Some(trace_id.as_str()))
        .collect();
    let kinds: Vec<_> = events.iter().map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![Some(EVENT_START), Some(EVENT_END_ERROR)]);
}
