//! Compare command

use super::common::{with_pair, CommandResult, KeyArgs, OutputFormat, PairSourceArgs};
use clap::Args;
use snapdelta_core::diff::{
    render_human_summary, run_comparison_parallel, run_comparison_with_context, ComparisonReport,
};
use snapdelta_core::errors::{ExError, ExErrorKind};
use snapdelta_core::snapshot::JsonLinesSnapshot;
use snapdelta_core_types::{RequestId, RunContext, TraceId};

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub sources: PairSourceArgs,

    #[command(flatten)]
    pub keys: KeyArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Read the snapshots on worker threads (JSON-lines sources only)
    #[arg(long)]
    pub parallel: bool,

    /// Request id recorded in the report and logs
    #[arg(long)]
    pub request_id: Option<String>,

    /// Id of an outer job, attached to the run's log events
    #[arg(long)]
    pub trace_id: Option<String>,
}

pub fn execute(args: CompareArgs) -> CommandResult {
    let config = args.keys.load_config()?;
    let mut ctx = match &args.request_id {
        Some(id) => RunContext::with_request_id(RequestId::from_string(id.as_str())),
        None => RunContext::new(),
    };
    if let Some(trace_id) = &args.trace_id {
        ctx = ctx.with_trace_id(TraceId::from_string(trace_id.as_str()));
    }

    let report: ComparisonReport = if args.parallel {
        let (previous, current) = match (&args.sources.previous_jsonl, &args.sources.current_jsonl)
        {
            (Some(previous), Some(current)) => (
                JsonLinesSnapshot::new(previous),
                JsonLinesSnapshot::new(current),
            ),
            _ => {
                return Err(ExError::new(ExErrorKind::InvalidInput)
                    .with_op("compare")
                    .with_message("--parallel needs --previous-jsonl and --current-jsonl")
                    .into())
            }
        };
        run_comparison_parallel(&previous, &current, &config, &ctx)?
    } else {
        with_pair(&args.sources, |previous, current| {
            run_comparison_with_context(previous, current, &config, &ctx)
        })?
    };

    match args.format {
        OutputFormat::Text => print!("{}", render_human_summary(&report)),
        OutputFormat::Json => println!("{}", report.to_json_pretty()?),
    }
    Ok(())
}
