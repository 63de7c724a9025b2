//! SQLite table as a snapshot source
//!
//! A pass walks the table in rowid order, one page of rows at a time, and
//! turns every row into a [`Record`] keyed by column name:
//!
//! | SQLite | Record value |
//! |---|---|
//! | `NULL` | `null` |
//! | `INTEGER` | number |
//! | `REAL` | number (`null` if not finite) |
//! | `TEXT` | string |
//! | `BLOB` | array of byte values |
//!
//! Only strings and numbers can serve as key fields, so a `NULL` or `BLOB`
//! key column surfaces as `MalformedRecord` in the diff operations.
//!
//! No statement stays open between pages, so at most one page is held in
//! memory and the connection is free for other work while a pass is
//! suspended. Rows changed behind the cursor mid-pass are not revisited.
//! `WITHOUT ROWID` tables are not supported.

#![allow(clippy::result_large_err)]

use std::collections::VecDeque;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use snapdelta_core::errors::ExError;
use snapdelta_core::model::Record;
use snapdelta_core::snapshot::{RecordIter, Snapshot};

use crate::errors::{from_rusqlite, invalid_input, source_unavailable, table_not_found, Result};

/// Rows fetched per page of a pass
pub const DEFAULT_PAGE_SIZE: usize = 1024;

/// Check that `name` is usable as a bare SQL identifier
///
/// Accepts `[A-Za-z_][A-Za-z0-9_]*`.
///
/// # Errors
///
/// `InvalidInput` otherwise.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(invalid_input("validate_identifier", format!("invalid SQL identifier `{}`", name))
            .with_entity_id(name))
    }
}

/// Whether a table named `table` exists
///
/// # Errors
///
/// `Persistence` if the schema query fails.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |_| Ok(()),
        )
        .optional()
        .map_err(|e| from_rusqlite(e).with_op("table_exists"))?;
    Ok(found.is_some())
}

/// Whether `table` has a column named `column`
///
/// # Errors
///
/// `Persistence` if the schema query fails.
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2 COLLATE NOCASE",
            [table, column],
            |_| Ok(()),
        )
        .optional()
        .map_err(|e| from_rusqlite(e).with_op("column_exists"))?;
    Ok(found.is_some())
}

/// A table read as a snapshot
///
/// Borrows the connection, so both sides of a comparison can share one
/// database file.
pub struct SqliteTable<'c> {
    conn: &'c Connection,
    table: String,
    page_size: usize,
}

impl<'c> SqliteTable<'c> {
    /// # Errors
    ///
    /// - `InvalidInput` if `table` is not a valid identifier
    /// - `NotFound` if the table does not exist
    pub fn open(conn: &'c Connection, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        if !table_exists(conn, &table)? {
            return Err(table_not_found("open_table", &table));
        }
        Ok(Self {
            conn,
            table,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Rows fetched per page (at least one)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Number of rows in the table
    ///
    /// # Errors
    ///
    /// `Persistence` if the count query fails.
    pub fn row_count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", self.table);
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| from_rusqlite(e).with_op("row_count").with_entity_id(&self.table))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

impl Snapshot for SqliteTable<'_> {
    fn records(&self) -> std::result::Result<RecordIter<'_>, ExError> {
        let mut pass = TablePass {
            source: self,
            last_rowid: None,
            page: VecDeque::new(),
            index: 0,
            exhausted: false,
        };
        // The first page is read eagerly so a missing table fails the open
        pass.fetch_page()?;
        Ok(Box::new(pass))
    }

    fn describe(&self) -> String {
        self.table.clone()
    }
}

/// One pass over a table, read page by page
struct TablePass<'t, 'c> {
    source: &'t SqliteTable<'c>,
    last_rowid: Option<i64>,
    page: VecDeque<std::result::Result<Record, ExError>>,
    index: u64,
    exhausted: bool,
}

impl TablePass<'_, '_> {
    fn fetch_page(&mut self) -> std::result::Result<(), ExError> {
        let source = self.source;
        let table = source.table.as_str();
        let limit = i64::try_from(source.page_size).unwrap_or(i64::MAX);

        let sql = match self.last_rowid {
            Some(_) => format!(
                "SELECT rowid, * FROM \"{}\" WHERE rowid > ?1 ORDER BY rowid LIMIT ?2",
                table
            ),
            None => format!("SELECT rowid, * FROM \"{}\" ORDER BY rowid LIMIT ?1", table),
        };
        let mut stmt = source
            .conn
            .prepare(&sql)
            .map_err(|e| source_unavailable(table, e))?;
        // Column 0 is the rowid
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .skip(1)
            .map(String::from)
            .collect();
        let query = match self.last_rowid {
            Some(after) => stmt.query(params![after, limit]),
            None => stmt.query(params![limit]),
        };
        let mut rows = query.map_err(|e| source_unavailable(table, e))?;

        let mut fetched = 0usize;
        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    fetched += 1;
                    match row.get::<_, i64>(0) {
                        Ok(rowid) => self.last_rowid = Some(rowid),
                        Err(e) => {
                            self.fail(source_unavailable(table, e));
                            break;
                        }
                    }
                    self.page
                        .push_back(row_to_record(row, &columns, table, self.index));
                    self.index += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    self.fail(source_unavailable(table, e));
                    break;
                }
            }
        }
        if fetched < source.page_size {
            self.exhausted = true;
        }

        tracing::trace!(table = %table, row_count = fetched, "read table page");
        Ok(())
    }

    fn fail(&mut self, err: ExError) {
        self.page.push_back(Err(err.with_record_index(self.index)));
        self.exhausted = true;
    }
}

impl Iterator for TablePass<'_, '_> {
    type Item = std::result::Result<Record, ExError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e.with_record_index(self.index)));
            }
        }
        self.page.pop_front()
    }
}

fn row_to_record(
    row: &Row<'_>,
    columns: &[String],
    table: &str,
    index: u64,
) -> std::result::Result<Record, ExError> {
    let mut record = Record::new();
    for (position, name) in columns.iter().enumerate() {
        let value = row
            .get_ref(position + 1)
            .map_err(|e| source_unavailable(table, e).with_record_index(index))?;
        record.insert(name.clone(), to_json(value));
    }
    Ok(record)
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}
