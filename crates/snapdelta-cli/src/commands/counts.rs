//! Counts command

use super::common::{open_db, CommandResult, KeyArgs, OutputFormat};
use clap::Args;
use snapdelta_core::diff::{aggregate, render_counts};
use snapdelta_core::errors::{ExError, ExErrorKind};
use snapdelta_core::model::CountByKey;
use snapdelta_core::snapshot::JsonLinesSnapshot;
use snapdelta_store::{count_by_partition, SqliteTable};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CountsArgs {
    /// SQLite database holding the table
    #[arg(long, requires = "table")]
    pub db: Option<PathBuf>,

    #[arg(long, requires = "db")]
    pub table: Option<String>,

    /// JSON-lines snapshot file
    #[arg(long, conflicts_with = "db")]
    pub jsonl: Option<PathBuf>,

    /// Let SQLite do the grouping (NULL partitions are skipped)
    #[arg(long, requires = "db")]
    pub pushdown: bool,

    #[command(flatten)]
    pub keys: KeyArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: CountsArgs) -> CommandResult {
    let config = args.keys.load_config()?;
    let keys = config.key_spec();

    let counts: CountByKey = match (&args.jsonl, &args.db, &args.table) {
        (Some(path), _, _) => aggregate(&JsonLinesSnapshot::new(path), &keys)?,
        (None, Some(db), Some(table)) => {
            let conn = open_db(db)?;
            if args.pushdown {
                if keys.normalize_partition {
                    return Err(ExError::new(ExErrorKind::InvalidInput)
                        .with_op("counts")
                        .with_message("--pushdown cannot normalize partition values")
                        .into());
                }
                count_by_partition(&conn, table, &keys.partition_field)?
            } else {
                aggregate(&SqliteTable::open(&conn, table.as_str())?, &keys)?
            }
        }
        _ => {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("counts")
                .with_message("give --db with --table, or --jsonl")
                .into())
        }
    };

    match args.format {
        OutputFormat::Text => print!("{}", render_counts(&counts)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&counts)?),
    }
    Ok(())
}
