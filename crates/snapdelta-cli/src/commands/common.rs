//! Arguments and helpers shared by the snapshot commands

use clap::{Args, ValueEnum};
use rusqlite::Connection;
use snapdelta_core::config::DiffConfig;
use snapdelta_core::errors::{ExError, ExErrorKind};
use snapdelta_core::model::{DeltaOrder, ExclusionSet, KeySpec};
use snapdelta_core::snapshot::{JsonLinesSnapshot, Snapshot};
use snapdelta_store::SqliteTable;
use std::path::{Path, PathBuf};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    /// Ascending partition key
    Key,
    /// Largest growth first
    Diff,
}

impl From<OrderArg> for DeltaOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Key => DeltaOrder::PartitionKey,
            OrderArg::Diff => DeltaOrder::DiffDescending,
        }
    }
}

/// Where the previous and current snapshots come from
#[derive(Debug, Args)]
pub struct PairSourceArgs {
    /// SQLite database holding both snapshot tables
    #[arg(long, requires_all = ["previous_table", "current_table"])]
    pub db: Option<PathBuf>,

    #[arg(long, requires = "db")]
    pub previous_table: Option<String>,

    #[arg(long, requires = "db")]
    pub current_table: Option<String>,

    /// Previous snapshot as a JSON-lines file
    #[arg(long, conflicts_with = "db", requires = "current_jsonl")]
    pub previous_jsonl: Option<PathBuf>,

    /// Current snapshot as a JSON-lines file
    #[arg(long, conflicts_with = "db", requires = "previous_jsonl")]
    pub current_jsonl: Option<PathBuf>,
}

/// Key fields, exclusions and ordering; flags override the config file
#[derive(Debug, Args)]
pub struct KeyArgs {
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Partition key field
    #[arg(long)]
    pub partition: Option<String>,

    /// Identity key fields, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub identity: Vec<String>,

    /// Strip `chr` and upper-case partition values
    #[arg(long)]
    pub normalize_partition: bool,

    /// Partition keys to leave out of novelty detection, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Delta row order
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,
}

impl KeyArgs {
    /// Config file (or defaults) with command-line overrides applied
    pub fn load_config(&self) -> Result<DiffConfig, ExError> {
        let mut config = match &self.config {
            Some(path) => DiffConfig::from_path(path)?,
            None => DiffConfig::default(),
        };

        let base = config.key_spec();
        let identity = if self.identity.is_empty() {
            base.identity_fields.clone()
        } else {
            self.identity.clone()
        };
        let keys = KeySpec::new(
            self.partition.clone().unwrap_or(base.partition_field),
            identity,
        )
        .with_normalized_partition(self.normalize_partition || base.normalize_partition);
        config = config.with_keys(&keys);

        if !self.exclude.is_empty() {
            let exclusions: ExclusionSet = config
                .exclusions()
                .iter()
                .map(str::to_string)
                .chain(self.exclude.iter().cloned())
                .collect();
            config = config.with_exclusions(exclusions);
        }
        if let Some(order) = self.order {
            config = config.with_order(order.into());
        }

        config.validate()?;
        Ok(config)
    }
}

/// Open both snapshots and hand them to `run`
///
/// SQLite tables borrow the connection, so the pair only lives for the
/// duration of the call.
pub fn with_pair<T>(
    args: &PairSourceArgs,
    run: impl FnOnce(&dyn Snapshot, &dyn Snapshot) -> Result<T, ExError>,
) -> Result<T, ExError> {
    if let (Some(previous), Some(current)) = (&args.previous_jsonl, &args.current_jsonl) {
        return run(
            &JsonLinesSnapshot::new(previous),
            &JsonLinesSnapshot::new(current),
        );
    }

    match (&args.db, &args.previous_table, &args.current_table) {
        (Some(db), Some(previous), Some(current)) => {
            let conn = open_db(db)?;
            let previous = SqliteTable::open(&conn, previous.as_str())?;
            let current = SqliteTable::open(&conn, current.as_str())?;
            run(&previous, &current)
        }
        _ => Err(missing_source()),
    }
}

/// Open an existing database file
pub fn open_db(path: &Path) -> Result<Connection, ExError> {
    if !path.exists() {
        return Err(ExError::new(ExErrorKind::NotFound)
            .with_op("open_db")
            .with_entity_id(path.display().to_string())
            .with_message("database file does not exist"));
    }
    snapdelta_store::db::open(path)
}

pub fn missing_source() -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("select_sources")
        .with_message(
            "give --db with --previous-table and --current-table, \
             or --previous-jsonl with --current-jsonl",
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_args() -> KeyArgs {
        KeyArgs {
            config: None,
            partition: None,
            identity: Vec::new(),
            normalize_partition: false,
            exclude: Vec::new(),
            order: None,
        }
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = key_args().load_config().unwrap();
        assert_eq!(config, DiffConfig::default());
    }

    #[test]
    fn test_flags_override_keys() {
        let args = KeyArgs {
            partition: Some("chrom".to_string()),
            identity: vec!["chrom".to_string(), "pos".to_string()],
            normalize_partition: true,
            exclude: vec!["chrX".to_string()],
            order: Some(OrderArg::Diff),
            ..key_args()
        };
        let config = args.load_config().unwrap();
        let keys = config.key_spec();
        assert_eq!(keys.partition_field, "chrom");
        assert_eq!(keys.identity_fields, vec!["chrom", "pos"]);
        assert!(keys.normalize_partition);
        assert!(config.exclusions().contains("chrX"));
        assert_eq!(config.order(), DeltaOrder::DiffDescending);
    }

    #[test]
    fn test_missing_config_file_fails() {
        let args = KeyArgs {
            config: Some(PathBuf::from("/nonexistent/snapdelta.toml")),
            ..key_args()
        };
        assert_eq!(args.load_config().unwrap_err().kind(), ExErrorKind::Io);
    }
}
