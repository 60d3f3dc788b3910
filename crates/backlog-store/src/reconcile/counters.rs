//! Counter maintainer

use crate::errors::{sqlite_op, Result};
use crate::repo::hydration::now_millis;
use crate::repo::PlanningRepo;
use backlog_core::counters::PassTally;
use backlog_core::errors::PlanningError;
use backlog_core::{CounterMode, ReconcileHook, SessionCounters, WriteStep};
use rusqlite::Transaction;

/// Fold one pass into the session counters and touch `updated_at`.
///
/// # Errors
/// `NotFound` if the session does not exist.
pub fn maintain_counters(
    tx: &Transaction,
    session_id: &str,
    mode: CounterMode,
    tally: &PassTally,
    hook: &dyn ReconcileHook,
) -> Result<SessionCounters> {
    let current = PlanningRepo::get_counters(tx, session_id)?.ok_or_else(|| {
        PlanningError::SessionNotFound {
            session_id: session_id.to_string(),
        }
    })?;

    let next = mode.apply(current, tally);

    tx.execute(
        "UPDATE sessions SET
            total_epics = ?1,
            total_stories = ?2,
            total_story_points = ?3,
            updated_at = ?4
         WHERE id = ?5",
        rusqlite::params![
            next.total_epics,
            next.total_stories,
            next.total_story_points,
            now_millis(),
            session_id,
        ],
    )
    .map_err(sqlite_op("maintain_counters"))?;
    hook.after_write(&WriteStep::UpdateCounters)?;

    tracing::debug!(
        session_id,
        mode = ?mode,
        total_epics = next.total_epics,
        total_stories = next.total_stories,
        total_story_points = next.total_story_points,
        "Updated session counters"
    );

    Ok(next)
}
