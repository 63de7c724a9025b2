//! Snapshot sources.
//!
//! A [`Snapshot`] is a re-iterable source of [`Record`]s. The diff engine
//! reads the previous snapshot twice (aggregation and identity index) and the
//! current snapshot twice (aggregation and novelty scan), calling
//! [`Snapshot::records`] once per pass.
//!
//! ## Re-iterability contract
//!
//! Every call to `records()` must start a fresh, complete pass. A source that
//! can only be read once must be materialised by the caller first, e.g. with
//! [`MemorySnapshot::materialize`].
//!
//! ## Provided sources
//!
//! - [`MemorySnapshot`]: records held in memory
//! - [`JsonLinesSnapshot`]: one JSON object per line, file reopened per pass
//! - [`SinglePass`]: wraps a one-shot iterator; a second pass fails with
//!   `SourceUnavailable`

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonLinesSnapshot;
pub use memory::{MemorySnapshot, SinglePass};

use crate::errors::ExError;
use crate::model::Record;

/// One pass over a snapshot
///
/// Per-record errors are yielded in place; consumers stop at the first one.
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Record, ExError>> + 'a>;

/// A point-in-time dataset used as one side of a comparison
pub trait Snapshot {
    /// Begin a new pass over every record
    ///
    /// # Errors
    ///
    /// `SourceUnavailable` if the pass cannot be started.
    fn records(&self) -> Result<RecordIter<'_>, ExError>;

    /// Short label for logs and error context
    fn describe(&self) -> String {
        "snapshot".to_string()
    }
}

impl<T: Snapshot + ?Sized> Snapshot for &T {
    fn records(&self) -> Result<RecordIter<'_>, ExError> {
        (**self).records()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
