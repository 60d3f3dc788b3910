//! Engine-level commands that require database I/O.

use crate::commands::reconcile::{reconcile, ReconcileOutcome, ReconcileRequest};
use backlog_core::ReconcileHook;
use backlog_store::errors::Result;
use rusqlite::Connection;

/// Engine-level commands
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Merge an extraction batch into a session.
    Reconcile(ReconcileRequest),
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Reconciled(ReconcileOutcome),
}

/// Apply an engine command, reporting every write to `hook`.
pub fn apply_engine_command(
    cmd: EngineCommand,
    conn: &mut Connection,
    hook: &dyn ReconcileHook,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::Reconcile(request) => {
            reconcile(conn, &request, hook).map(EngineCommandResult::Reconciled)
        }
    }
}
