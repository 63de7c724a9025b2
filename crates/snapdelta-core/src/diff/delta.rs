//! Delta Comparator: inner join of two CountByKey mappings.

use std::collections::BTreeSet;

use crate::model::{CountByKey, DeltaOrder, DeltaReport, DeltaRow};

/// Compute one [`DeltaRow`] per partition key present in both mappings
///
/// Keys found in only one mapping produce no row. Rows come out in
/// ascending partition-key order; use [`sort_delta_rows`] for another order.
pub fn compare(previous: &CountByKey, current: &CountByKey) -> Vec<DeltaRow> {
    common_keys(previous, current)
        .into_iter()
        .filter_map(|key| {
            let previous_count = previous.get(key)?;
            let current_count = current.get(key)?;
            Some(DeltaRow::new(key.to_string(), previous_count, current_count))
        })
        .collect()
}

/// Like [`compare`], also listing the keys that appear on one side only
pub fn compare_with_coverage(previous: &CountByKey, current: &CountByKey) -> DeltaReport {
    let (only_previous, only_current) = key_set_delta(previous, current);
    DeltaReport {
        rows: compare(previous, current),
        only_previous,
        only_current,
    }
}

/// Reorder delta rows in place
pub fn sort_delta_rows(rows: &mut [DeltaRow], order: DeltaOrder) {
    match order {
        DeltaOrder::PartitionKey => rows.sort_by(|a, b| a.partition_key.cmp(&b.partition_key)),
        DeltaOrder::DiffDescending => rows.sort_by(|a, b| {
            b.diff
                .cmp(&a.diff)
                .then_with(|| a.partition_key.cmp(&b.partition_key))
        }),
    }
}

fn common_keys<'a>(previous: &'a CountByKey, current: &'a CountByKey) -> BTreeSet<&'a str> {
    let previous_keys: BTreeSet<&str> = previous.keys().collect();
    let current_keys: BTreeSet<&str> = current.keys().collect();
    previous_keys.intersection(&current_keys).copied().collect()
}

/// Returns `(only_previous, only_current)`, each ascending
fn key_set_delta(previous: &CountByKey, current: &CountByKey) -> (Vec<String>, Vec<String>) {
    let only_previous = previous
        .keys()
        .filter(|k| !current.contains_key(k))
        .map(str::to_string)
        .collect();
    let only_current = current
        .keys()
        .filter(|k| !previous.contains_key(k))
        .map(str::to_string)
        .collect();
    (only_previous, only_current)
}
