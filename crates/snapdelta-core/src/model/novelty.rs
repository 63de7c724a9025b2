use serde::{Deserialize, Serialize};

use super::keys::{IdentityKey, PartitionKey};
use super::record::Record;

/// NoveltyRecord - a current-snapshot record with no counterpart in the previous snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoveltyRecord {
    /// Identity key extracted from the record
    pub identity_key: IdentityKey,
    /// Partition key extracted from the record (after normalisation)
    pub partition_key: PartitionKey,
    /// The full original record
    pub record: Record,
}

/// Counters over the records a novelty scan has consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoveltyStats {
    /// Records read from the current snapshot
    pub scanned: u64,
    /// Records skipped because their partition key is excluded
    pub excluded: u64,
    /// Records whose identity key exists in the previous snapshot
    pub already_present: u64,
    /// Records yielded as novel
    pub novel: u64,
}
