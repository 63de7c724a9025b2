//! snapdelta store - SQLite-backed snapshots
//!
//! Provides:
//! - Connection management
//! - Tables as re-iterable snapshot sources
//! - Per-partition counting pushed down to SQL
//! - TSV import into a new table

pub mod db;
pub mod errors;
pub mod import;
pub mod query;
pub mod table;

// Re-export key types
pub use errors::Result;
pub use import::import_tsv;
pub use query::count_by_partition;
pub use table::{column_exists, table_exists, validate_identifier, SqliteTable};
