//! Comparison pipeline: aggregate both snapshots, compare counts, find novel records.
//!
//! ## Logging Ownership
//!
//! The pipeline owns lifecycle logging for a run:
//! - `log_op_start!` / `log_op_end!` around each stage (`aggregate`, `find_novel`)
//! - `log_op_start!` / `log_op_end!` / `log_op_error!` around `run_comparison`
//!
//! Stage functions below this layer use only `tracing::debug!()`. An error
//! is logged once, at the `run_comparison` boundary.
//!
//! ## Passes
//!
//! `previous` is read twice (aggregate, identity index) and `current` twice
//! (aggregate, novelty scan).

#![allow(clippy::result_large_err)]

use std::thread::{self, ScopedJoinHandle};
use std::time::Instant;

use snapdelta_core_types::schema::{SNAPSHOT_CURRENT, SNAPSHOT_PREVIOUS};
use snapdelta_core_types::RunContext;

use super::aggregate::aggregate;
use super::delta::{compare_with_coverage, sort_delta_rows};
use super::novelty::{find_novel_with_index, IdentityIndex};
use super::report::ComparisonReport;
use crate::config::DiffConfig;
use crate::errors::{ExError, ExErrorKind};
use crate::model::{CountByKey, KeySpec};
use crate::snapshot::Snapshot;
use crate::{log_op_end, log_op_error, log_op_start};

/// Compare two snapshots with a fresh [`RunContext`]
///
/// # Errors
///
/// The first error from any stage, unchanged apart from the request id.
pub fn run_comparison(
    previous: &dyn Snapshot,
    current: &dyn Snapshot,
    config: &DiffConfig,
) -> Result<ComparisonReport, ExError> {
    run_comparison_with_context(previous, current, config, &RunContext::new())
}

/// Compare two snapshots, stages running one after another
///
/// # Errors
///
/// - `InvalidConfig` if `config` fails validation
/// - The first error from any stage
pub fn run_comparison_with_context(
    previous: &dyn Snapshot,
    current: &dyn Snapshot,
    config: &DiffConfig,
    ctx: &RunContext,
) -> Result<ComparisonReport, ExError> {
    boundary("run_comparison", ctx, || {
        config.validate()?;
        let keys = config.key_spec();

        let previous_counts = stage("aggregate", SNAPSHOT_PREVIOUS, || aggregate(previous, &keys))?;
        let current_counts = stage("aggregate", SNAPSHOT_CURRENT, || aggregate(current, &keys))?;
        let index = IdentityIndex::build(previous, &keys)?;

        finish(ctx, config, &keys, current, previous_counts, current_counts, index)
    })
}

/// Compare two snapshots, running the independent passes on scoped threads
///
/// Both aggregations and the identity index build run concurrently; the
/// novelty scan runs on the calling thread afterwards. The report equals
/// the one [`run_comparison_with_context`] produces for the same inputs,
/// apart from `generated_at` and `request_id`.
///
/// # Errors
///
/// - As for [`run_comparison_with_context`]; when several passes fail, the
///   error reported is the one the sequential run would have hit first
/// - `Internal` if a worker thread panics
pub fn run_comparison_parallel(
    previous: &(dyn Snapshot + Sync),
    current: &(dyn Snapshot + Sync),
    config: &DiffConfig,
    ctx: &RunContext,
) -> Result<ComparisonReport, ExError> {
    boundary("run_comparison", ctx, || {
        config.validate()?;
        let keys = config.key_spec();

        let (previous_counts, current_counts, index) = thread::scope(|s| {
            let keys = &keys;
            let previous_handle =
                s.spawn(move || stage("aggregate", SNAPSHOT_PREVIOUS, || aggregate(previous, keys)));
            let current_handle =
                s.spawn(move || stage("aggregate", SNAPSHOT_CURRENT, || aggregate(current, keys)));
            let index_handle = s.spawn(move || IdentityIndex::build(previous, keys));
            (
                join(previous_handle, "aggregate previous"),
                join(current_handle, "aggregate current"),
                join(index_handle, "build identity index"),
            )
        });

        finish(ctx, config, &keys, current, previous_counts?, current_counts?, index?)
    })
}

fn finish(
    ctx: &RunContext,
    config: &DiffConfig,
    keys: &KeySpec,
    current: &dyn Snapshot,
    previous_counts: CountByKey,
    current_counts: CountByKey,
    index: IdentityIndex,
) -> Result<ComparisonReport, ExError> {
    let mut delta = compare_with_coverage(&previous_counts, &current_counts);
    sort_delta_rows(&mut delta.rows, config.order());

    let (novel, stats) = stage("find_novel", SNAPSHOT_CURRENT, || {
        find_novel_with_index(index, current, config.exclusions(), keys)?.collect_all()
    })?;

    ComparisonReport::assemble(
        ctx.request_id.clone(),
        previous_counts,
        current_counts,
        delta,
        novel,
        stats,
    )
}

fn boundary<F>(op: &'static str, ctx: &RunContext, run: F) -> Result<ComparisonReport, ExError>
where
    F: FnOnce() -> Result<ComparisonReport, ExError>,
{
    log_op_start!(
        op,
        request_id = ctx.request_id.as_str(),
        trace_id = ctx.trace_id.as_ref().map(|t| t.as_str()).unwrap_or_default()
    );
    let start = Instant::now();

    let report = run().map_err(|e| {
        let e = e.with_request_id(ctx.request_id.clone());
        log_op_error!(
            op,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = ctx.request_id.as_str()
        );
        e
    })?;

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = ctx.request_id.as_str(),
        delta_len = report.delta.rows.len(),
        novel_count = report.novel.len()
    );
    Ok(report)
}

fn stage<T, F>(op: &'static str, snapshot: &'static str, run: F) -> Result<T, ExError>
where
    F: FnOnce() -> Result<T, ExError>,
{
    log_op_start!(op, snapshot = snapshot);
    let start = Instant::now();
    let value = run()?;
    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        snapshot = snapshot
    );
    Ok(value)
}

fn join<T>(
    handle: ScopedJoinHandle<'_, Result<T, ExError>>,
    task: &str,
) -> Result<T, ExError> {
    handle.join().map_err(|_| {
        ExError::new(ExErrorKind::Internal)
            .with_op("run_comparison_parallel")
            .with_message(format!("{} worker panicked", task))
    })?
}
