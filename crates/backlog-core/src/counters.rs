//! Session aggregate counters and the two maintenance modes

use serde::{Deserialize, Serialize};

/// Denormalized aggregates stored on the Session row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCounters {
    pub total_epics: u32,
    pub total_stories: u32,
    pub total_story_points: u32,
}

/// How a reconciliation pass folds its results into the counters.
///
/// Chosen by the caller; the engine never infers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterMode {
    /// The pass is the authoritative full set: counters become its totals
    Replace,
    /// The pass appends: only newly inserted rows are added
    Increment,
}

/// What one pass contributed, split by inserted vs. reconciled (inserted + updated)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassTally {
    pub epics_reconciled: u32,
    pub stories_reconciled: u32,
    pub story_points_reconciled: u32,
    pub epics_inserted: u32,
    pub stories_inserted: u32,
    pub story_points_inserted: u32,
}

impl CounterMode {
    /// Counters after applying `tally` to `current`
    pub fn apply(&self, current: SessionCounters, tally: &PassTally) -> SessionCounters {
        match self {
            CounterMode::Replace => SessionCounters {
                total_epics: tally.epics_reconciled,
                total_stories: tally.stories_reconciled,
                total_story_points: tally.story_points_reconciled,
            },
            CounterMode::Increment => SessionCounters {
                total_epics: current.total_epics.saturating_add(tally.epics_inserted),
                total_stories: current.total_stories.saturating_add(tally.stories_inserted),
                total_story_points: current
                    .total_story_points
                    .saturating_add(tally.story_points_inserted),
            },
        }
    }
}
