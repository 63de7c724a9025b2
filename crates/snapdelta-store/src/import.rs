//! Bulk import of tab-separated text into a new table
//!
//! The first non-blank line is the header. A single leading `#` is dropped
//! from it (VCF-style `#CHROM`), and every header field becomes a TEXT
//! column. Each following non-blank line becomes one row. Everything is
//! inserted in one transaction, so a failed import leaves no table behind.

#![allow(clippy::result_large_err)]

use std::collections::HashSet;
use std::io::BufRead;

use rusqlite::{params_from_iter, Connection};

use crate::errors::{from_rusqlite, invalid_input, io_error, Result};
use crate::table::{table_exists, validate_identifier};

const FIELD_SEPARATOR: char = '\t';

/// Create `table` from TSV text and load every row
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// - `InvalidInput` if the table exists already, the header is missing or
///   has invalid or duplicate column names, or a row has the wrong number
///   of fields
/// - `Io` if reading fails
/// - `Persistence` if SQLite rejects the load
pub fn import_tsv<R: BufRead>(conn: &mut Connection, table: &str, reader: R) -> Result<u64> {
    validate_identifier(table)?;
    if table_exists(conn, table)? {
        return Err(invalid_input("import_tsv", "table already exists").with_entity_id(table));
    }

    let mut lines = reader
        .lines()
        .zip(1u64..)
        .filter(|(line, _)| !matches!(line, Ok(text) if text.trim().is_empty()));

    let header = match lines.next() {
        Some((line, _)) => line.map_err(|e| io_error("import_tsv", e))?,
        None => return Err(invalid_input("import_tsv", "input has no header line")),
    };
    let columns = parse_header(&header)?;

    let tx = conn.transaction().map_err(from_rusqlite)?;
    let column_defs: Vec<String> = columns.iter().map(|c| format!("\"{}\" TEXT", c)).collect();
    tx.execute(
        &format!("CREATE TABLE \"{}\" ({})", table, column_defs.join(", ")),
        [],
    )
    .map_err(from_rusqlite)?;

    let mut inserted = 0u64;
    {
        let placeholders = vec!["?"; columns.len()].join(", ");
        let mut stmt = tx
            .prepare(&format!("INSERT INTO \"{}\" VALUES ({})", table, placeholders))
            .map_err(from_rusqlite)?;

        for (line, line_number) in lines {
            let line = line.map_err(|e| io_error("import_tsv", e))?;
            let fields: Vec<&str> = line.trim_end_matches('\r').split(FIELD_SEPARATOR).collect();
            if fields.len() != columns.len() {
                return Err(invalid_input(
                    "import_tsv",
                    format!(
                        "line {} has {} fields, header has {}",
                        line_number,
                        fields.len(),
                        columns.len()
                    ),
                )
                .with_entity_id(table));
            }
            stmt.execute(params_from_iter(fields.iter()))
                .map_err(from_rusqlite)?;
            inserted += 1;
        }
    }
    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(table = %table, row_count = inserted, "imported tsv");
    Ok(inserted)
}

fn parse_header(header: &str) -> Result<Vec<String>> {
    let header = header.trim_end_matches('\r');
    let header = header.strip_prefix('#').unwrap_or(header);

    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for name in header.split(FIELD_SEPARATOR) {
        let name = name.trim();
        validate_identifier(name).map_err(|e| e.with_op("import_tsv"))?;
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(invalid_input("import_tsv", format!("duplicate column `{}`", name)));
        }
        columns.push(name.to_string());
    }
    Ok(columns)
}
