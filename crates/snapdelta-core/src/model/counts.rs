use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::keys::PartitionKey;

/// CountByKey - number of records per partition key in one snapshot
///
/// Keys are kept ordered so that iteration, serialization and everything
/// derived from it is deterministic. A key is never stored with a zero count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountByKey(BTreeMap<PartitionKey, u64>);

impl CountByKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record to `key`'s group
    pub fn increment(&mut self, key: PartitionKey) {
        *self.0.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of distinct partition keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts, i.e. the number of records aggregated
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Builds a mapping from `(key, count)` pairs, summing repeated keys and
/// dropping zero counts.
impl FromIterator<(PartitionKey, u64)> for CountByKey {
    fn from_iter<I: IntoIterator<Item = (PartitionKey, u64)>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        for (key, count) in iter {
            if count > 0 {
                *counts.entry(key).or_insert(0) += count;
            }
        }
        Self(counts)
    }
}

/// DeltaRow - count change for a partition key present in both snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRow {
    pub partition_key: PartitionKey,
    pub previous_count: u64,
    pub current_count: u64,
    /// `current_count - previous_count`
    pub diff: i64,
}

impl DeltaRow {
    pub fn new(partition_key: PartitionKey, previous_count: u64, current_count: u64) -> Self {
        Self {
            partition_key,
            previous_count,
            current_count,
            diff: signed_diff(previous_count, current_count),
        }
    }
}

fn signed_diff(previous: u64, current: u64) -> i64 {
    let diff = i128::from(current) - i128::from(previous);
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}

/// Requested ordering of delta rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaOrder {
    /// Ascending partition key
    #[default]
    PartitionKey,
    /// Largest growth first; ties broken by ascending partition key
    DiffDescending,
}

/// DeltaReport - delta rows plus the partition keys the inner join dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaReport {
    /// One row per partition key present in both snapshots
    pub rows: Vec<DeltaRow>,
    /// Partition keys seen only in the previous snapshot
    pub only_previous: Vec<PartitionKey>,
    /// Partition keys seen only in the current snapshot
    pub only_current: Vec<PartitionKey>,
}
