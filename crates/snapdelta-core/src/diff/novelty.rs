//! Novelty Finder: current-snapshot records absent from the previous snapshot.
//!
//! Works in two steps:
//!
//! 1. [`IdentityIndex::build`] reads the previous snapshot once and keeps
//!    every identity key in a hash set. Memory is O(|previous|); in exchange
//!    each membership check during the scan is O(1) on average.
//! 2. [`NoveltyScan`] lazily walks a fresh pass of the current snapshot and
//!    yields the records whose partition key is not excluded and whose
//!    identity key is not in the index.

use std::collections::HashSet;

use crate::errors::ExError;
use crate::model::{ExclusionSet, IdentityKey, KeySpec, NoveltyRecord, NoveltyStats};
use crate::snapshot::{RecordIter, Snapshot};

/// Identity keys present in one snapshot
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    keys: HashSet<IdentityKey>,
}

impl IdentityIndex {
    /// Read one full pass of `snapshot` and collect its identity keys
    ///
    /// Partition fields are not inspected here.
    ///
    /// # Errors
    ///
    /// - Errors from the source are propagated unchanged
    /// - `MalformedRecord`: an identity field is missing or unreadable
    pub fn build(snapshot: &dyn Snapshot, keys: &KeySpec) -> Result<Self, ExError> {
        let mut index = HashSet::new();
        for (item, position) in snapshot.records()?.zip(0u64..) {
            let record = item?;
            let identity = keys
                .identity_key(&record, position)
                .map_err(|e| e.with_op("build_identity_index"))?;
            index.insert(identity);
        }

        tracing::debug!(
            snapshot = %snapshot.describe(),
            key_count = index.len(),
            "built identity index"
        );
        Ok(Self { keys: index })
    }

    pub fn contains(&self, identity_key: &str) -> bool {
        self.keys.contains(identity_key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<IdentityKey>> FromIterator<S> for IdentityIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Find the records of `current` that are new relative to `previous`
///
/// The identity index over `previous` is built before this returns; the
/// scan over `current` is lazy. Calling it again starts over with fresh
/// passes over both snapshots.
///
/// # Errors
///
/// Errors from building the index. Errors while scanning `current` are
/// yielded by the returned iterator.
pub fn find_novel<'a>(
    previous: &dyn Snapshot,
    current: &'a dyn Snapshot,
    exclusions: &ExclusionSet,
    keys: &'a KeySpec,
) -> Result<NoveltyScan<'a>, ExError> {
    let index = IdentityIndex::build(previous, keys)?;
    find_novel_with_index(index, current, exclusions, keys)
}

/// Scan `current` against an already built index
///
/// # Errors
///
/// Errors starting the pass over `current`.
pub fn find_novel_with_index<'a>(
    index: IdentityIndex,
    current: &'a dyn Snapshot,
    exclusions: &ExclusionSet,
    keys: &'a KeySpec,
) -> Result<NoveltyScan<'a>, ExError> {
    Ok(NoveltyScan {
        records: current.records()?,
        index,
        exclusions: exclusions.normalized(keys),
        keys,
        position: 0,
        stats: NoveltyStats::default(),
        finished: false,
    })
}

/// Lazy sequence of novel records
///
/// Yields `Ok` for every novel record. The first error is yielded once and
/// ends the sequence; records yielded before it stay valid.
pub struct NoveltyScan<'a> {
    records: RecordIter<'a>,
    index: IdentityIndex,
    exclusions: ExclusionSet,
    keys: &'a KeySpec,
    position: u64,
    stats: NoveltyStats,
    finished: bool,
}

impl NoveltyScan<'_> {
    /// Counters for the records consumed so far
    pub fn stats(&self) -> NoveltyStats {
        self.stats
    }

    /// Drain the scan, returning every novel record and the final counters
    ///
    /// # Errors
    ///
    /// The first error the scan yields.
    pub fn collect_all(mut self) -> Result<(Vec<NoveltyRecord>, NoveltyStats), ExError> {
        let mut novel = Vec::new();
        for item in self.by_ref() {
            novel.push(item?);
        }
        Ok((novel, self.stats))
    }

    fn fail(&mut self, err: ExError) -> Option<Result<NoveltyRecord, ExError>> {
        self.finished = true;
        Some(Err(err))
    }
}

impl Iterator for NoveltyScan<'_> {
    type Item = Result<NoveltyRecord, ExError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(err) => return self.fail(err),
            };
            let position = self.position;
            self.position += 1;
            self.stats.scanned += 1;

            // Both keys must be readable even when the record ends up excluded.
            let partition_key = match self.keys.partition_key(&record, position) {
                Ok(key) => key,
                Err(err) => return self.fail(err.with_op("find_novel")),
            };
            let identity_key = match self.keys.identity_key(&record, position) {
                Ok(key) => key,
                Err(err) => return self.fail(err.with_op("find_novel")),
            };

            if self.exclusions.contains(&partition_key) {
                self.stats.excluded += 1;
                continue;
            }
            if self.index.contains(&identity_key) {
                self.stats.already_present += 1;
                continue;
            }

            self.stats.novel += 1;
            return Some(Ok(NoveltyRecord {
                identity_key,
                partition_key,
                record,
            }));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::model::Record;
    use crate::snapshot::MemorySnapshot;

    fn row(partition: &str, id: u64) -> Record {
        Record::new()
            .with("partition_key", partition)
            .with("identity_key", id)
            .with("payload", format!("row-{}", id))
    }

    fn snapshot(rows: Vec<Record>) -> MemorySnapshot {
        MemorySnapshot::from_records("test", rows)
    }

    #[test]
    fn test_yields_only_new_identities() {
        let previous = snapshot(vec![row("A", 1), row("A", 2)]);
        let current = snapshot(vec![row("A", 1), row("A", 3)]);
        let keys = KeySpec::default();
        let (novel, stats) = find_novel(&previous, &current, &ExclusionSet::new(), &keys)
            .unwrap()
            .collect_all()
            .unwrap();
        assert_eq!(novel.len(), 1);
        assert_eq!(novel[0].identity_key, "3");
        assert_eq!(novel[0].record.get("payload"), Some(&serde_json::json!("row-3")));
        assert_eq!(stats.scanned, 2);
        assert_eq!(stats.already_present, 1);
        assert_eq!(stats.novel, 1);
    }

    #[test]
    fn test_composite_keys_with_separator_in_values_do_not_collide() {
        let keys = KeySpec::new("p", ["a", "b"]);
        let previous = snapshot(vec![Record::new().with("p", "A").with("a", "1-2").with("b", "3")]);
        let current = snapshot(vec![Record::new().with("p", "A").with("a", "1").with("b", "2-3")]);
        let (novel, stats) = find_novel(&previous, &current, &ExclusionSet::new(), &keys)
            .unwrap()
            .collect_all()
            .unwrap();
        assert_eq!(novel.len(), 1);
        assert_eq!(novel[0].record.get("b"), Some(&serde_json::json!("2-3")));
        assert_eq!(stats.already_present, 0);
    }

    #[test]
    fn test_excluded_partition_never_novel() {
        let previous = snapshot(vec![]);
        let current = snapshot(vec![row("X", 99), row("A", 4)]);
        let exclusions: ExclusionSet = ["X", "Y"].into_iter().collect();
        let keys = KeySpec::default();
        let (novel, stats) = find_novel(&previous, &current, &exclusions, &keys)
            .unwrap()
            .collect_all()
            .unwrap();
        assert_eq!(novel.len(), 1);
        assert_eq!(novel[0].identity_key, "4");
        assert_eq!(stats.excluded, 1);
    }

    #[test]
    fn test_scan_is_lazy_and_fused_after_error() {
        let previous = snapshot(vec![]);
        let current = snapshot(vec![
            row("A", 1),
            Record::new().with("partition_key", "A"),
            row("A", 3),
        ]);
        let keys = KeySpec::default();
        let mut scan = find_novel(&previous, &current, &ExclusionSet::new(), &keys).unwrap();

        assert!(scan.next().unwrap().is_ok());
        assert_eq!(scan.stats().scanned, 1);

        let err = scan.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::MalformedRecord);
        assert_eq!(err.record_index(), Some(1));
        assert!(scan.next().is_none());
        assert!(scan.next().is_none());
    }

    #[test]
    fn test_malformed_identity_fails_even_when_excluded() {
        let previous = snapshot(vec![]);
        let current = snapshot(vec![Record::new().with("partition_key", "X")]);
        let exclusions: ExclusionSet = ["X"].into_iter().collect();
        let keys = KeySpec::default();
        let result = find_novel(&previous, &current, &exclusions, &keys)
            .unwrap()
            .collect_all();
        assert_eq!(result.unwrap_err().kind(), ExErrorKind::MalformedRecord);
    }

    #[test]
    fn test_malformed_previous_fails_before_scan() {
        let previous = snapshot(vec![Record::new().with("partition_key", "A")]);
        let current = snapshot(vec![row("A", 1)]);
        let keys = KeySpec::default();
        let err = find_novel(&previous, &current, &ExclusionSet::new(), &keys)
            .err()
            .unwrap();
        assert_eq!(err.op(), Some("build_identity_index"));
    }

    #[test]
    fn test_index_reuse_restarts_scan() {
        let current = snapshot(vec![row("A", 1), row("B", 2)]);
        let index: IdentityIndex = ["1"].into_iter().collect();
        let keys = KeySpec::default();
        let first: Vec<_> = find_novel_with_index(index.clone(), &current, &ExclusionSet::new(), &keys)
            .unwrap()
            .collect();
        let second: Vec<_> = find_novel_with_index(index, &current, &ExclusionSet::new(), &keys)
            .unwrap()
            .collect();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }
}
