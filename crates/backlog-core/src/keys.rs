//! Natural keys and in-payload deduplication

use crate::errors::PlanningError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Natural key of a Story within its Session
///
/// Displays as `"{epic_number}-{story_number}"`, which is exactly what the
/// `story_key` column stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryKey {
    pub epic_number: u32,
    pub story_number: u32,
}

impl StoryKey {
    pub fn new(epic_number: u32, story_number: u32) -> Self {
        Self {
            epic_number,
            story_number,
        }
    }
}

impl fmt::Display for StoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.epic_number, self.story_number)
    }
}

impl FromStr for StoryKey {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlanningError::UnknownVariant {
            field: "story_key",
            value: s.to_string(),
        };
        let (epic, story) = s.split_once('-').ok_or_else(invalid)?;
        Ok(Self {
            epic_number: epic.parse().map_err(|_| invalid())?,
            story_number: story.parse().map_err(|_| invalid())?,
        })
    }
}

/// Collapse items sharing a natural key.
///
/// Each key keeps the position of its first occurrence and the value of its
/// last occurrence, so a later correction in the same payload wins without
/// reordering the batch.
pub fn dedup_by_key<T, K, F>(items: &[T], key: F) -> Vec<&T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::with_capacity(items.len());
    let mut out: Vec<&T> = Vec::with_capacity(items.len());
    for item in items {
        let k = key(item);
        match slots.get(&k).copied() {
            Some(idx) => out[idx] = item,
            None => {
                slots.insert(k, out.len());
                out.push(item);
            }
        }
    }
    out
}
