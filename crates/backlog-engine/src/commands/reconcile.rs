//! Reconciliation orchestrator.
//!
//! Order inside the transaction: epic upsert → parent resolution → story
//! upsert → counter maintenance. Any error rolls the whole call back.
//!
//! Precondition: at most one reconciliation per session is in flight. Two
//! concurrent calls for the same session can both miss a key in the matcher
//! and insert it twice; the calling layer serializes turns per session.

use backlog_core::counters::PassTally;
use backlog_core::keys::dedup_by_key;
use backlog_core::rules::{validate_epics, validate_stories};
use backlog_core::{
    CounterMode, EpicExtraction, ReconcileHook, SessionCounters, StoryExtraction, StoryKey,
};
use backlog_core::{log_op_end, log_op_error, log_op_start};
use backlog_core_types::RequestContext;
use backlog_store::errors::{from_rusqlite, Result};
use backlog_store::reconcile::{
    batch_upsert, maintain_counters, match_epics, match_stories, resolve_parents, Upsertable,
};
use rusqlite::{Connection, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

/// Input of one reconciliation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub session_id: String,
    #[serde(default)]
    pub epics: Vec<EpicExtraction>,
    #[serde(default)]
    pub stories: Vec<StoryExtraction>,
    pub counter_mode: CounterMode,
    /// Correlation ids for log lines; not part of the wire payload
    #[serde(skip)]
    pub context: Option<RequestContext>,
}

impl ReconcileRequest {
    pub fn new(
        session_id: impl Into<String>,
        epics: Vec<EpicExtraction>,
        stories: Vec<StoryExtraction>,
        counter_mode: CounterMode,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            epics,
            stories,
            counter_mode,
            context: None,
        }
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    /// Every epic reconciled in this call plus those resolved as story parents
    pub epic_ids_by_number: BTreeMap<u32, String>,
    /// Story key (`"{epic}-{story}"`) → id for every persisted story
    pub story_ids_by_key: BTreeMap<String, String>,
    pub epics_inserted: usize,
    pub epics_updated: usize,
    pub stories_inserted: usize,
    pub stories_updated: usize,
    pub stories_skipped: usize,
    /// Keys of the skipped orphans, in input order
    pub skipped_story_keys: Vec<String>,
    pub session: SessionCounters,
}

/// Run one reconciliation pass in its own transaction.
///
/// # Errors
/// Validation errors before any write; `ConstraintViolation` (e.g. unknown
/// session on insert), `NotFound` (unknown session at counter time),
/// `Persistence`, or whatever `hook` returns. In every error case nothing
/// from this call is committed.
pub fn reconcile(
    conn: &mut Connection,
    request: &ReconcileRequest,
    hook: &dyn ReconcileHook,
) -> Result<ReconcileOutcome> {
    let start = Instant::now();
    let request_id = request
        .context
        .as_ref()
        .map(|c| c.request_id.to_string())
        .unwrap_or_default();
    let trace_id = request
        .context
        .as_ref()
        .and_then(|c| c.trace_id.as_ref())
        .map(|t| t.to_string())
        .unwrap_or_default();
    log_op_start!(
        "reconcile",
        session_id = request.session_id.as_str(),
        request_id = request_id.as_str(),
        trace_id = trace_id.as_str(),
        epics_in = request.epics.len() as u64,
        stories_in = request.stories.len() as u64,
        counter_mode = ?request.counter_mode
    );

    let result = conn
        .transaction()
        .map_err(from_rusqlite)
        .and_then(|tx| {
            let outcome = reconcile_in_tx(&tx, request, hook)?;
            tx.commit().map_err(from_rusqlite)?;
            Ok(outcome)
        });

    let duration_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(outcome) => {
            log_op_end!(
                "reconcile",
                duration_ms = duration_ms,
                session_id = request.session_id.as_str(),
                request_id = request_id.as_str(),
                trace_id = trace_id.as_str(),
                epics_inserted = outcome.epics_inserted as u64,
                epics_updated = outcome.epics_updated as u64,
                stories_inserted = outcome.stories_inserted as u64,
                stories_updated = outcome.stories_updated as u64,
                skipped = outcome.stories_skipped as u64
            );
            Ok(outcome)
        }
        Err(e) => {
            let e = match &request.context {
                Some(ctx) => {
                    let e = e.with_request_id(ctx.request_id.clone());
                    match &ctx.trace_id {
                        Some(tid) => e.with_trace_id(tid.clone()),
                        None => e,
                    }
                }
                None => e,
            };
            log_op_error!(
                "reconcile",
                e.clone(),
                duration_ms = duration_ms,
                session_id = request.session_id.as_str(),
                request_id = request_id.as_str(),
                trace_id = trace_id.as_str()
            );
            Err(e)
        }
    }
}

/// Run one reconciliation pass inside a caller-owned transaction.
///
/// Nothing is committed here: a caller that fails a later step in the same
/// transaction rolls this pass back with it.
///
/// # Errors
/// Same as [`reconcile`]; the transaction is left open either way.
pub fn reconcile_in_tx(
    tx: &Transaction,
    request: &ReconcileRequest,
    hook: &dyn ReconcileHook,
) -> Result<ReconcileOutcome> {
    let session_id = request.session_id.as_str();

    validate_epics(&request.epics)?;
    validate_stories(&request.stories)?;

    // Epics
    let epics = dedup_by_key(&request.epics, |e| e.number);
    let numbers: Vec<u32> = epics.iter().map(|e| e.number).collect();
    let existing_epics = match_epics(tx, session_id, &numbers)?;
    let epic_result = batch_upsert(tx, session_id, &epics, &existing_epics, hook)?;

    // Parents
    let stories = dedup_by_key(&request.stories, StoryExtraction::key);
    let mut epic_ids = epic_result.ids_by_key.clone();
    let resolution = resolve_parents(tx, session_id, &stories, &mut epic_ids)?;

    // Stories
    let story_keys: Vec<StoryKey> = resolution
        .resolved
        .iter()
        .map(|resolved| resolved.natural_key())
        .collect();
    let existing_stories = match_stories(tx, session_id, &story_keys)?;
    let story_result = batch_upsert(
        tx,
        session_id,
        &resolution.resolved,
        &existing_stories,
        hook,
    )?;

    // Counters: payload epics plus parents found through the fallback lookup
    let inserted: HashSet<StoryKey> = story_result.inserted.iter().copied().collect();
    let mut tally = PassTally {
        epics_reconciled: epic_ids.len() as u32,
        stories_reconciled: story_result.ids_by_key.len() as u32,
        epics_inserted: epic_result.inserted.len() as u32,
        stories_inserted: story_result.inserted.len() as u32,
        ..PassTally::default()
    };
    for resolved in &resolution.resolved {
        let points = resolved.story.story_points.unwrap_or(0);
        tally.story_points_reconciled = tally.story_points_reconciled.saturating_add(points);
        if inserted.contains(&resolved.story.key()) {
            tally.story_points_inserted = tally.story_points_inserted.saturating_add(points);
        }
    }
    let session = maintain_counters(tx, session_id, request.counter_mode, &tally, hook)?;

    Ok(ReconcileOutcome {
        epic_ids_by_number: epic_ids.into_iter().collect(),
        story_ids_by_key: story_result
            .ids_by_key
            .into_iter()
            .map(|(key, id)| (key.to_string(), id))
            .collect(),
        epics_inserted: epic_result.inserted.len(),
        epics_updated: epic_result.updated.len(),
        stories_inserted: story_result.inserted.len(),
        stories_updated: story_result.updated.len(),
        stories_skipped: resolution.orphans.len(),
        skipped_story_keys: resolution
            .orphans
            .iter()
            .map(|s| s.key().to_string())
            .collect(),
        session,
    })
}
