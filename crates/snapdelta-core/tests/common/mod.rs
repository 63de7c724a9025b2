use snapdelta_core::model::Record;
use snapdelta_core::snapshot::MemorySnapshot;

/// Record with the default key fields
#[allow(dead_code)]
pub fn row(partition: &str, id: u64) -> Record {
    Record::new()
        .with("partition_key", partition)
        .with("identity_key", id)
}

/// Snapshot built from `(partition, id)` pairs
#[allow(dead_code)]
pub fn snapshot(label: &str, rows: &[(&str, u64)]) -> MemorySnapshot {
    MemorySnapshot::from_records(label, rows.iter().map(|(p, id)| row(p, *id)))
}

/// Variant-shaped record keyed on `chrom-pos-ref-alt`
#[allow(dead_code)]
pub fn variant(chrom: &str, pos: u64, reference: &str, alt: &str) -> Record {
    Record::new()
        .with("chrom", chrom)
        .with("pos", pos)
        .with("ref", reference)
        .with("alt", alt)
        .with("qual", 50)
}

/// Previous and current snapshots of Scenario A
#[allow(dead_code)]
pub fn scenario_a() -> (MemorySnapshot, MemorySnapshot) {
    (
        snapshot("previous", &[("A", 1), ("A", 2), ("B", 3)]),
        snapshot("current", &[("A", 1), ("A", 2), ("A", 4), ("B", 3), ("B", 5)]),
    )
}
