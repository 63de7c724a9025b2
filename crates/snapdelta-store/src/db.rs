//! Database connection management
//!
//! Provides utilities for opening and managing SQLite connections

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path.as_ref()).map_err(|e| {
        from_rusqlite(e)
            .with_op("open")
            .with_entity_id(path.as_ref().display().to_string())
    })
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection for bulk loads and large scans
pub fn configure(conn: &Connection) -> Result<()> {
    // WAL lets a comparison read while another process imports
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
        .map_err(from_rusqlite)?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(from_rusqlite)?;
    conn.pragma_update(None, "temp_store", "MEMORY")
        .map_err(from_rusqlite)?;

    Ok(())
}
