//! Natural-key matcher
//!
//! Finds the active rows of a session whose natural key is in a given set.
//! Tombstoned rows never match, so a deleted key behaves as free.

use crate::errors::{sqlite_op, Result};
use crate::reconcile::MAX_BOUND_PARAMS;
use backlog_core::StoryKey;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row, Transaction};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

/// A natural key with a column in one table
pub trait NaturalKey: Copy + Eq + Hash + Display {
    const TABLE: &'static str;
    /// Column compared with `IN (...)`
    const KEY_COLUMN: &'static str;
    /// Columns selected to rebuild the key, read by `from_row` starting at index 1
    const READ_COLUMNS: &'static str;

    fn to_sql_value(&self) -> Value;

    fn from_row(row: &Row, start: usize) -> rusqlite::Result<Self>;
}

/// Epic numbers
impl NaturalKey for u32 {
    const TABLE: &'static str = "epics";
    const KEY_COLUMN: &'static str = "number";
    const READ_COLUMNS: &'static str = "number";

    fn to_sql_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_row(row: &Row, start: usize) -> rusqlite::Result<Self> {
        row.get(start)
    }
}

impl NaturalKey for StoryKey {
    const TABLE: &'static str = "stories";
    const KEY_COLUMN: &'static str = "story_key";
    const READ_COLUMNS: &'static str = "epic_number, story_number";

    fn to_sql_value(&self) -> Value {
        Value::Text(self.to_string())
    }

    fn from_row(row: &Row, start: usize) -> rusqlite::Result<Self> {
        Ok(StoryKey::new(row.get(start)?, row.get(start + 1)?))
    }
}

/// Active rows of `session_id` whose key is in `keys`, as key → surrogate id.
///
/// Keys are deduplicated first and an empty set issues no query. Should two
/// active rows share a key, the oldest one wins.
pub fn match_active<K: NaturalKey>(
    tx: &Transaction,
    session_id: &str,
    keys: &[K],
) -> Result<HashMap<K, String>> {
    let mut seen = HashSet::with_capacity(keys.len());
    let unique: Vec<K> = keys.iter().copied().filter(|k| seen.insert(*k)).collect();

    let mut found: HashMap<K, String> = HashMap::with_capacity(unique.len());
    if unique.is_empty() {
        return Ok(found);
    }

    for chunk in unique.chunks(MAX_BOUND_PARAMS - 1) {
        let placeholders = vec!["?"; chunk.len()].join(",");
        let sql = format!(
            "SELECT id, {} FROM {} \
             WHERE session_id = ? AND deleted_at IS NULL AND {} IN ({}) \
             ORDER BY rowid",
            K::READ_COLUMNS,
            K::TABLE,
            K::KEY_COLUMN,
            placeholders
        );

        let mut params: Vec<Value> = Vec::with_capacity(chunk.len() + 1);
        params.push(Value::Text(session_id.to_string()));
        params.extend(chunk.iter().map(NaturalKey::to_sql_value));

        let mut stmt = tx.prepare(&sql).map_err(sqlite_op("match_active"))?;
        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(sqlite_op("match_active"))?;
        while let Some(row) = rows.next().map_err(sqlite_op("match_active"))? {
            let id: String = row.get(0).map_err(sqlite_op("match_active"))?;
            let key = K::from_row(row, 1).map_err(sqlite_op("match_active"))?;
            if let Some(kept) = found.get(&key) {
                tracing::warn!(
                    table = K::TABLE,
                    session_id,
                    key = %key,
                    kept_id = %kept,
                    ignored_id = %id,
                    "Several active rows share a natural key"
                );
                continue;
            }
            found.insert(key, id);
        }
    }

    tracing::debug!(
        table = K::TABLE,
        session_id,
        requested = unique.len(),
        matched = found.len(),
        "Matched natural keys"
    );

    Ok(found)
}

/// Active epics of a session by number
pub fn match_epics(
    tx: &Transaction,
    session_id: &str,
    numbers: &[u32],
) -> Result<HashMap<u32, String>> {
    match_active(tx, session_id, numbers)
}

/// Active stories of a session by story key
pub fn match_stories(
    tx: &Transaction,
    session_id: &str,
    keys: &[StoryKey],
) -> Result<HashMap<StoryKey, String>> {
    match_active(tx, session_id, keys)
}
