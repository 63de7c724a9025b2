//! snapdelta core - comparison kernel for pairs of dataset snapshots
//!
//! This crate provides the data model and operations for comparing a
//! previous and a current snapshot of the same dataset, including:
//! - Records, key extraction and partition-key normalisation
//! - Per-partition counting (Aggregator)
//! - Count deltas over the partitions both snapshots share (Delta Comparator)
//! - Records new in the current snapshot (Novelty Finder)
//! - A comparison pipeline producing a digest-stamped report
//! - TOML configuration, structured errors and logging
//!
//! The kernel does no I/O of its own except for the JSON-lines snapshot source.

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod snapshot;

// Re-export commonly used types
pub use config::DiffConfig;
pub use diff::{aggregate, compare, find_novel, run_comparison, ComparisonReport};
pub use errors::{ExError, ExErrorKind, Result, SnapDeltaError};
pub use model::{CountByKey, DeltaRow, ExclusionSet, KeySpec, Record};
pub use snapshot::{MemorySnapshot, Snapshot};
