use std::sync::Mutex;

use super::{RecordIter, Snapshot};
use crate::errors::{ExError, ExErrorKind};
use crate::model::Record;

/// Snapshot whose records are held in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySnapshot {
    label: String,
    records: Vec<Record>,
}

impl MemorySnapshot {
    pub fn new(label: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }

    pub fn from_records<I: IntoIterator<Item = Record>>(label: impl Into<String>, iter: I) -> Self {
        Self::new(label, iter.into_iter().collect())
    }

    /// Read one full pass of `source` into memory
    ///
    /// This is how a single-pass source is made to satisfy the
    /// re-iterability contract.
    ///
    /// # Errors
    ///
    /// Propagates the first error from the source unchanged.
    pub fn materialize(source: &dyn Snapshot) -> Result<Self, ExError> {
        let records = source.records()?.collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(source.describe(), records))
    }

    pub fn records_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Snapshot for MemorySnapshot {
    fn records(&self) -> Result<RecordIter<'_>, ExError> {
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Snapshot backed by an iterator that can be consumed only once
///
/// The first call to `records()` hands out the iterator; later calls fail
/// with `SourceUnavailable`.
pub struct SinglePass<I> {
    label: String,
    inner: Mutex<Option<I>>,
}

impl<I> SinglePass<I>
where
    I: Iterator<Item = Result<Record, ExError>>,
{
    pub fn new(label: impl Into<String>, iter: I) -> Self {
        Self {
            label: label.into(),
            inner: Mutex::new(Some(iter)),
        }
    }
}

impl<I> Snapshot for SinglePass<I>
where
    I: Iterator<Item = Result<Record, ExError>>,
{
    fn records(&self) -> Result<RecordIter<'_>, ExError> {
        let taken = self.inner.lock().ok().and_then(|mut slot| slot.take());
        match taken {
            Some(iter) => Ok(Box::new(iter)),
            None => Err(ExError::new(ExErrorKind::SourceUnavailable)
                .with_op("records")
                .with_entity_id(self.label.clone())
                .with_message("single-pass snapshot was already consumed")),
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
