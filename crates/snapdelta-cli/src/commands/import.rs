//! Import command

use super::common::CommandResult;
use clap::Args;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// SQLite database (created if missing)
    #[arg(long)]
    pub db: PathBuf,

    /// Name of the table to create
    #[arg(long)]
    pub table: String,

    /// TSV file to load, `-` for stdin
    pub file: PathBuf,
}

pub fn execute(args: ImportArgs) -> CommandResult {
    let mut conn = snapdelta_store::db::open(&args.db)?;
    snapdelta_store::db::configure(&conn)?;

    let rows = if args.file.as_os_str() == "-" {
        snapdelta_store::import_tsv(&mut conn, &args.table, io::stdin().lock())?
    } else {
        let file = File::open(&args.file)
            .map_err(|e| format!("cannot open {}: {}", args.file.display(), e))?;
        snapdelta_store::import_tsv(&mut conn, &args.table, BufReader::new(file))?
    };

    println!("Imported {} rows into table {}", rows, args.table);
    Ok(())
}
