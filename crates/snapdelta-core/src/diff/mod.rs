//! Snapshot comparison.
//!
//! Three independent operations over a pair of snapshots, plus a pipeline
//! that runs all three and assembles a [`ComparisonReport`].
//!
//! ## Entry point
//!
//! ```
//! use snapdelta_core::config::DiffConfig;
//! use snapdelta_core::diff::{render_human_summary, run_comparison};
//! use snapdelta_core::model::Record;
//! use snapdelta_core::snapshot::MemorySnapshot;
//!
//! let row = |p: &str, id: u64| Record::new().with("partition_key", p).with("identity_key", id);
//! let previous = MemorySnapshot::from_records("previous", vec![row("A", 1)]);
//! let current = MemorySnapshot::from_records("current", vec![row("A", 1), row("A", 2)]);
//!
//! let report = run_comparison(&previous, &current, &DiffConfig::default()).unwrap();
//! assert_eq!(report.delta.rows[0].diff, 1);
//! assert_eq!(report.novel[0].identity_key, "2");
//! let _summary = render_human_summary(&report);
//! ```
//!
//! ## Guarantees
//!
//! - **Count conservation**: the counts of a snapshot sum to its record count.
//! - **Inner join**: delta rows exist only for partition keys present on
//!   both sides; the others are listed in [`DeltaReport`](crate::model::DeltaReport).
//! - **Determinism**: identical inputs produce identical counts, rows and
//!   novel sets, hence an identical `report_digest`.

pub mod aggregate;
pub mod delta;
pub mod human_summary;
pub mod novelty;
pub mod pipeline;
pub mod report;

pub use aggregate::aggregate;
pub use delta::{compare, compare_with_coverage, sort_delta_rows};
pub use human_summary::{render_counts, render_human_summary};
pub use novelty::{find_novel, find_novel_with_index, IdentityIndex, NoveltyScan};
pub use pipeline::{run_comparison, run_comparison_parallel, run_comparison_with_context};
pub use report::{compute_report_digest, ComparisonReport, REPORT_SCHEMA_VERSION};
