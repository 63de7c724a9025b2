//! Error handling for snapdelta-store
//!
//! Wraps snapdelta-core ExError with store-specific helpers

use snapdelta_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a snapshot-read error for a table pass
pub fn source_unavailable(table: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::SourceUnavailable)
        .with_op("read_table")
        .with_entity_id(table)
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an invalid input error
pub fn invalid_input(operation: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op(operation.to_string())
        .with_message(reason)
}

/// Create a missing table error
pub fn table_not_found(operation: &str, table: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(operation.to_string())
        .with_entity_id(table)
        .with_message("table does not exist")
}
