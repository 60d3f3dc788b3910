//! Parent resolver: story epic numbers → persisted epic ids

use crate::errors::Result;
use crate::reconcile::matcher::match_epics;
use crate::reconcile::rows::ResolvedStory;
use backlog_core::StoryExtraction;
use rusqlite::Transaction;
use std::collections::{BTreeSet, HashMap};

/// Stories split by whether their parent epic could be found
#[derive(Debug, Clone, PartialEq)]
pub struct ParentResolution<'a> {
    /// Stories with a persisted parent, in input order
    pub resolved: Vec<ResolvedStory<'a>>,
    /// Orphans: never written, only counted
    pub orphans: Vec<&'a StoryExtraction>,
}

/// Resolve each story's parent.
///
/// `epic_ids` holds the epics reconciled in this call. Numbers missing
/// from it are looked up once among the session's persisted epics and the
/// hits are merged back into `epic_ids`.
pub fn resolve_parents<'a>(
    tx: &Transaction,
    session_id: &str,
    stories: &[&'a StoryExtraction],
    epic_ids: &mut HashMap<u32, String>,
) -> Result<ParentResolution<'a>> {
    let missing: BTreeSet<u32> = stories
        .iter()
        .map(|s| s.epic_number)
        .filter(|n| !epic_ids.contains_key(n))
        .collect();

    if !missing.is_empty() {
        let numbers: Vec<u32> = missing.into_iter().collect();
        let found = match_epics(tx, session_id, &numbers)?;
        tracing::debug!(
            session_id,
            requested = numbers.len(),
            found = found.len(),
            "Resolved parents from persisted epics"
        );
        epic_ids.extend(found);
    }

    let mut resolution = ParentResolution {
        resolved: Vec::with_capacity(stories.len()),
        orphans: Vec::new(),
    };
    for &story in stories {
        match epic_ids.get(&story.epic_number) {
            Some(epic_id) => resolution.resolved.push(ResolvedStory {
                story,
                epic_id: epic_id.clone(),
            }),
            None => {
                tracing::warn!(
                    session_id,
                    story_key = %story.key(),
                    epic_number = story.epic_number,
                    "Skipping story with unresolved parent epic"
                );
                resolution.orphans.push(story);
            }
        }
    }

    Ok(resolution)
}
