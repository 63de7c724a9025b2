//! Aggregator: per-partition-key record counts for one snapshot.

use crate::errors::ExError;
use crate::model::{CountByKey, KeySpec};
use crate::snapshot::Snapshot;

/// Count the records of `snapshot` per partition key
///
/// Reads one full pass. Only the partition field is inspected; identity
/// fields and payload are ignored and nothing is excluded.
///
/// # Errors
///
/// - `SourceUnavailable` (or any other error the source yields): propagated unchanged
/// - `MalformedRecord`: a record's partition field is missing or unreadable
pub fn aggregate(snapshot: &dyn Snapshot, keys: &KeySpec) -> Result<CountByKey, ExError> {
    let mut counts = CountByKey::new();
    for (item, index) in snapshot.records()?.zip(0u64..) {
        let record = item?;
        let partition_key = keys
            .partition_key(&record, index)
            .map_err(|e| e.with_op("aggregate"))?;
        counts.increment(partition_key);
    }

    tracing::debug!(
        snapshot = %snapshot.describe(),
        key_count = counts.len(),
        row_count = counts.total(),
        "aggregated snapshot"
    );
    Ok(counts)
}
