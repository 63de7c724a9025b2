//! Novel command
//!
//! Records are printed as the scan yields them; counters go to stderr at
//! the end.

use super::common::{with_pair, CommandResult, KeyArgs, OutputFormat, PairSourceArgs};
use clap::Args;
use snapdelta_core::diff::find_novel;
use snapdelta_core::errors::{ExError, ExErrorKind, SnapDeltaError};
use snapdelta_core::model::NoveltyStats;
use std::io::{self, Write};

#[derive(Debug, Args)]
pub struct NovelArgs {
    #[command(flatten)]
    pub sources: PairSourceArgs,

    #[command(flatten)]
    pub keys: KeyArgs,

    /// `text` prints identity and partition key per line, `json` one record object per line
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: NovelArgs) -> CommandResult {
    let config = args.keys.load_config()?;
    let keys = config.key_spec();

    let stats = with_pair(&args.sources, |previous, current| {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let mut scan = find_novel(previous, current, config.exclusions(), &keys)?;

        for item in scan.by_ref() {
            let novel = item?;
            let line = match args.format {
                OutputFormat::Text => format!("{}\t{}", novel.identity_key, novel.partition_key),
                OutputFormat::Json => serde_json::to_string(&novel)
                    .map_err(|e| ExError::from(SnapDeltaError::from(e)).with_op("novel"))?,
            };
            writeln!(out, "{}", line).map_err(write_failed)?;
        }
        out.flush().map_err(write_failed)?;
        Ok(scan.stats())
    })?;

    eprintln!("{}", stats_line(&stats));
    Ok(())
}

fn stats_line(stats: &NoveltyStats) -> String {
    format!(
        "scanned {}, excluded {}, already present {}, novel {}",
        stats.scanned, stats.excluded, stats.already_present, stats.novel
    )
}

fn write_failed(e: io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op("write_output")
        .with_message(e.to_string())
}
