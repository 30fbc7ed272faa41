//! Integer ID allocation backed by the `_sequence` table.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SequenceRow {
    value: i64,
}

/// Atomically increment the named sequence and return the new value.
///
/// Every caller contends on the same counter record, so this is meant
/// to run inside [`crate::retry::retry_on_conflict`].
pub(crate) async fn next_id<C: Connection>(db: &Surreal<C>, name: &str) -> Result<i64, DbError> {
    let result = db
        .query("UPDATE type::record('_sequence', $name) SET value += 1 RETURN AFTER")
        .bind(("name", name.to_string()))
        .await?;
    let mut result = result
        .check()
        .map_err(|e| DbError::Query(e.to_string()))?;

    let rows: Vec<SequenceRow> = result.take(0)?;
    rows.into_iter()
        .next()
        .map(|row| row.value)
        .ok_or_else(|| DbError::Migration(format!("sequence `{name}` is not initialised")))
}
