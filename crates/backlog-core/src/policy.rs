//! Write hooks observed by the reconciliation engine
//!
//! Every statement that mutates the store is reported to a `ReconcileHook`
//! right after it executes, inside the open transaction. Returning an error
//! aborts the pass and rolls every earlier write back.

use crate::errors::ExError;
use crate::keys::StoryKey;

/// One executed write statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStep {
    /// Multi-row insert of new epics
    InsertEpics { rows: usize },
    /// Update of one matched epic
    UpdateEpic { number: u32 },
    /// Multi-row insert of new stories
    InsertStories { rows: usize },
    /// Update of one matched story
    UpdateStory { key: StoryKey },
    /// Session counter update
    UpdateCounters,
}

/// Observer and veto point for reconciliation writes
pub trait ReconcileHook: Send + Sync {
    /// Called after `step` has executed.
    ///
    /// # Errors
    ///
    /// Any error aborts the pass; the transaction is rolled back.
    #[allow(clippy::result_large_err)]
    fn after_write(&self, step: &WriteStep) -> std::result::Result<(), ExError>;
}

/// Accepts every write (the default)
pub struct NoopReconcileHook;

impl ReconcileHook for NoopReconcileHook {
    fn after_write(&self, _: &WriteStep) -> std::result::Result<(), ExError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fixtures::{AbortAfterWrites, WriteRecorder};

/// Hooks for tests: scripted aborts and write recording
#[cfg(any(test, feature = "test-support"))]
mod fixtures {
    use super::{ReconcileHook, WriteStep};
    use crate::errors::{ExError, ExErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, PoisonError};

    /// Fails the pass once `limit` writes have executed.
    pub struct AbortAfterWrites {
        limit: usize,
        seen: AtomicUsize,
    }

    impl AbortAfterWrites {
        pub fn new(limit: usize) -> Self {
            Self {
                limit,
                seen: AtomicUsize::new(0),
            }
        }

        pub fn writes_seen(&self) -> usize {
            self.seen.load(Ordering::SeqCst)
        }
    }

    impl ReconcileHook for AbortAfterWrites {
        fn after_write(&self, step: &WriteStep) -> std::result::Result<(), ExError> {
            let seen = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
            if seen >= self.limit {
                return Err(ExError::new(ExErrorKind::Aborted)
                    .with_op("after_write")
                    .with_message(format!("aborted after write {} ({:?})", seen, step)));
            }
            Ok(())
        }
    }

    /// Records every write step in order
    #[derive(Default)]
    pub struct WriteRecorder {
        steps: Mutex<Vec<WriteStep>>,
    }

    impl WriteRecorder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn steps(&self) -> Vec<WriteStep> {
            self.steps
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl ReconcileHook for WriteRecorder {
        fn after_write(&self, step: &WriteStep) -> std::result::Result<(), ExError> {
            self.steps
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(step.clone());
            Ok(())
        }
    }

}
