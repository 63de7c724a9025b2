//! Aggregation pushed down to SQLite.

#![allow(clippy::result_large_err)]

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use snapdelta_core::errors::{ExError, ExErrorKind};
use snapdelta_core::model::CountByKey;

use crate::errors::{from_rusqlite, table_not_found, Result};
use crate::table::{column_exists, table_exists, validate_identifier};

/// Count the rows of `table` per value of `column` with a single GROUP BY
///
/// Matches [`aggregate`](snapdelta_core::diff::aggregate) over the same
/// table with an un-normalised partition field, except that rows whose
/// `column` is `NULL` are skipped instead of failing the count. A non-finite
/// REAL key fails here just as it does in `aggregate`.
///
/// # Errors
///
/// - `InvalidInput` if `table` or `column` is not a valid identifier
/// - `NotFound` if the table or column does not exist
/// - `MalformedRecord` if a group key is a BLOB or a non-finite REAL
/// - `Persistence` if the query fails
pub fn count_by_partition(conn: &Connection, table: &str, column: &str) -> Result<CountByKey> {
    validate_identifier(table)?;
    validate_identifier(column)?;
    if !table_exists(conn, table)? {
        return Err(table_not_found("count_by_partition", table));
    }
    if !column_exists(conn, table, column)? {
        return Err(ExError::new(ExErrorKind::NotFound)
            .with_op("count_by_partition")
            .with_entity_id(column)
            .with_message(format!("table `{}` has no such column", table)));
    }

    let sql = format!(
        "SELECT \"{column}\", COUNT(*) FROM \"{table}\" WHERE \"{column}\" IS NOT NULL GROUP BY \"{column}\""
    );
    let map_err = |e: rusqlite::Error| {
        from_rusqlite(e)
            .with_op("count_by_partition")
            .with_entity_id(table)
    };

    let mut stmt = conn.prepare(&sql).map_err(map_err)?;
    let mut rows = stmt.query([]).map_err(map_err)?;

    let mut groups = Vec::new();
    while let Some(row) = rows.next().map_err(map_err)? {
        let key = render_key(row.get_ref(0).map_err(map_err)?, table, column)?;
        let count: i64 = row.get(1).map_err(map_err)?;
        groups.push((key, u64::try_from(count).unwrap_or(0)));
    }

    // REAL and INTEGER groups can render to the same text; the collect sums them
    let counts: CountByKey = groups.into_iter().collect();
    tracing::debug!(
        table = %table,
        column = %column,
        key_count = counts.len(),
        row_count = counts.total(),
        "counted partitions in sqlite"
    );
    Ok(counts)
}

fn render_key(value: ValueRef<'_>, table: &str, column: &str) -> Result<String> {
    match value {
        ValueRef::Text(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Integer(i) => Ok(i.to_string()),
        ValueRef::Real(f) if f.is_finite() => Ok(serde_json::Value::from(f).to_string()),
        ValueRef::Real(_) | ValueRef::Null | ValueRef::Blob(_) => Err(ExError::new(ExErrorKind::MalformedRecord)
            .with_op("count_by_partition")
            .with_entity_id(column)
            .with_message(format!("unreadable partition value in table `{}`", table))),
    }
}
