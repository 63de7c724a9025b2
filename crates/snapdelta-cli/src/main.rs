//! snapdelta CLI
//!
//! Command-line interface for comparing dataset snapshots

use clap::{Parser, Subcommand, ValueEnum};
use snapdelta_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "snapdelta")]
#[command(about = "snapdelta - Compare two snapshots of a dataset", long_about = None)]
struct Cli {
    /// Log output on stderr
    #[arg(long, value_enum, global = true, default_value_t = LogMode::Off)]
    log: LogMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogMode {
    Off,
    /// Human-readable, debug level
    Dev,
    /// JSON lines, info level
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a TSV file into a new SQLite table
    Import(commands::import::ImportArgs),
    /// Count records per partition key in one snapshot
    Counts(commands::counts::CountsArgs),
    /// List current records whose identity is absent from the previous snapshot
    Novel(commands::novel::NovelArgs),
    /// Full comparison: counts, deltas and novel records
    Compare(commands::compare::CompareArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.log {
        LogMode::Off => {}
        LogMode::Dev => logging_facility::init(Profile::Development),
        LogMode::Json => logging_facility::init(Profile::Production),
    }

    let result = match cli.command {
        Commands::Import(args) => commands::import::execute(args),
        Commands::Counts(args) => commands::counts::execute(args),
        Commands::Novel(args) => commands::novel::execute(args),
        Commands::Compare(args) => commands::compare::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
