//! Batch upserter, generic over the entity kind

use crate::errors::{sqlite_op, Result};
use crate::reconcile::matcher::NaturalKey;
use crate::reconcile::MAX_BOUND_PARAMS;
use crate::repo::hydration::now_millis;
use backlog_core::errors::{ExError, ExErrorKind};
use backlog_core::keys::dedup_by_key;
use backlog_core::{ReconcileHook, WriteStep};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Transaction};
use std::collections::HashMap;

/// An extracted row that can be inserted or matched by natural key
pub trait Upsertable {
    type Key: NaturalKey;

    /// Columns of the multi-row insert, in `insert_values` order
    const INSERT_COLUMNS: &'static [&'static str];

    fn natural_key(&self) -> Self::Key;

    /// Bound values for one row of the insert
    fn insert_values(&self, session_id: &str, now: i64) -> Result<Vec<Value>>;

    /// Overwrite every mutable field of the row `id`.
    ///
    /// The natural key and the tombstone are never touched.
    fn update(&self, tx: &Transaction, id: &str, now: i64) -> Result<()>;

    fn insert_step(rows: usize) -> WriteStep;

    fn update_step(key: Self::Key) -> WriteStep;
}

impl<T: Upsertable> Upsertable for &T {
    type Key = T::Key;
    const INSERT_COLUMNS: &'static [&'static str] = T::INSERT_COLUMNS;

    fn natural_key(&self) -> Self::Key {
        (**self).natural_key()
    }

    fn insert_values(&self, session_id: &str, now: i64) -> Result<Vec<Value>> {
        (**self).insert_values(session_id, now)
    }

    fn update(&self, tx: &Transaction, id: &str, now: i64) -> Result<()> {
        (**self).update(tx, id, now)
    }

    fn insert_step(rows: usize) -> WriteStep {
        T::insert_step(rows)
    }

    fn update_step(key: Self::Key) -> WriteStep {
        T::update_step(key)
    }
}

/// Outcome of one batch upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertResult<K: NaturalKey> {
    /// Natural key → surrogate id for inserted and updated rows alike
    pub ids_by_key: HashMap<K, String>,
    /// Keys of inserted rows, in input order
    pub inserted: Vec<K>,
    /// Keys of updated rows, in input order
    pub updated: Vec<K>,
}

impl<K: NaturalKey> Default for UpsertResult<K> {
    fn default() -> Self {
        Self {
            ids_by_key: HashMap::new(),
            inserted: Vec::new(),
            updated: Vec::new(),
        }
    }
}

/// Insert new rows and update matched ones.
///
/// `existing` is the matcher's answer for these rows. New rows go out as a
/// single multi-row insert in input order (split only past the bound
/// parameter limit); matched rows get one update each. Every statement is
/// reported to `hook`, and any failure aborts with the transaction still
/// open for the caller to roll back.
pub fn batch_upsert<R: Upsertable>(
    tx: &Transaction,
    session_id: &str,
    rows: &[R],
    existing: &HashMap<R::Key, String>,
    hook: &dyn ReconcileHook,
) -> Result<UpsertResult<R::Key>> {
    let rows = dedup_by_key(rows, |row: &R| row.natural_key());
    let (to_update, to_insert): (Vec<&R>, Vec<&R>) = rows
        .into_iter()
        .partition(|row| existing.contains_key(&row.natural_key()));

    let now = now_millis();
    let mut result = UpsertResult::default();

    if !to_insert.is_empty() {
        insert_rows(tx, session_id, &to_insert, now, hook, &mut result)?;
    }

    for row in to_update {
        let key = row.natural_key();
        let Some(id) = existing.get(&key) else {
            continue;
        };
        row.update(tx, id, now)?;
        hook.after_write(&R::update_step(key))?;
        result.ids_by_key.insert(key, id.clone());
        result.updated.push(key);
    }

    tracing::debug!(
        table = <R::Key as NaturalKey>::TABLE,
        session_id,
        inserted = result.inserted.len(),
        updated = result.updated.len(),
        "Batch upsert complete"
    );

    Ok(result)
}

fn insert_rows<R: Upsertable>(
    tx: &Transaction,
    session_id: &str,
    rows: &[&R],
    now: i64,
    hook: &dyn ReconcileHook,
    result: &mut UpsertResult<R::Key>,
) -> Result<()> {
    let columns = R::INSERT_COLUMNS;
    let row_placeholder = format!("({})", vec!["?"; columns.len()].join(","));
    let rows_per_statement = (MAX_BOUND_PARAMS / columns.len()).max(1);

    for chunk in rows.chunks(rows_per_statement) {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {} RETURNING id, {}",
            <R::Key as NaturalKey>::TABLE,
            columns.join(", "),
            vec![row_placeholder.as_str(); chunk.len()].join(","),
            <R::Key as NaturalKey>::READ_COLUMNS,
        );

        let mut params: Vec<Value> = Vec::with_capacity(chunk.len() * columns.len());
        for row in chunk {
            params.extend(row.insert_values(session_id, now)?);
        }

        let mut returned: HashMap<R::Key, String> = HashMap::with_capacity(chunk.len());
        {
            let mut stmt = tx.prepare(&sql).map_err(sqlite_op("batch_insert"))?;
            let mut out = stmt
                .query(params_from_iter(params.iter()))
                .map_err(sqlite_op("batch_insert"))?;
            while let Some(row) = out.next().map_err(sqlite_op("batch_insert"))? {
                let id: String = row.get(0).map_err(sqlite_op("batch_insert"))?;
                let key = <R::Key as NaturalKey>::from_row(row, 1)
                    .map_err(sqlite_op("batch_insert"))?;
                returned.insert(key, id);
            }
        }

        if returned.len() != chunk.len() {
            return Err(ExError::new(ExErrorKind::Internal)
                .with_op("batch_insert")
                .with_session_id(session_id)
                .with_message(format!(
                    "insert into {} returned {} ids for {} rows",
                    <R::Key as NaturalKey>::TABLE,
                    returned.len(),
                    chunk.len()
                )));
        }

        hook.after_write(&R::insert_step(chunk.len()))?;

        for row in chunk {
            let key = row.natural_key();
            result.inserted.push(key);
        }
        result.ids_by_key.extend(returned);
    }

    Ok(())
}
