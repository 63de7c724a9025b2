//! Comparison scenarios over small hand-written snapshot pairs.
//!
//! Each test follows GIVEN / WHEN / THEN over the three operations and the
//! full pipeline.

mod common;

use common::{row, scenario_a, snapshot, variant};
use snapdelta_core::config::DiffConfig;
use snapdelta_core::diff::{aggregate, compare, compare_with_coverage, find_novel, run_comparison};
use snapdelta_core::model::{CountByKey, DeltaRow, ExclusionSet, KeySpec};
use snapdelta_core::snapshot::MemorySnapshot;

fn counts(pairs: &[(&str, u64)]) -> CountByKey {
    pairs.iter().map(|(k, c)| (k.to_string(), *c)).collect()
}

#[test]
fn test_scenario_a_counts_and_deltas() {
    // GIVEN the Scenario A pair
    let (previous, current) = scenario_a();
    let keys = KeySpec::default();

    // WHEN aggregating both sides
    let previous_counts = aggregate(&previous, &keys).unwrap();
    let current_counts = aggregate(&current, &keys).unwrap();

    // THEN the counts are exact
    assert_eq!(previous_counts, counts(&[("A", 2), ("B", 1)]));
    assert_eq!(current_counts, counts(&[("A", 3), ("B", 2)]));

    // AND both common keys get a +1 delta
    let rows = compare(&previous_counts, &current_counts);
    assert_eq!(
        rows,
        vec![
            DeltaRow::new("A".to_string(), 2, 3),
            DeltaRow::new("B".to_string(), 1, 2),
        ]
    );
    assert!(rows.iter().all(|r| r.diff == 1));
}

#[test]
fn test_scenario_b_excluded_partition_suppresses_novelty() {
    // GIVEN a current snapshot with id=99 in partition X, absent from previous
    let previous = snapshot("previous", &[("A", 1)]);
    let current = snapshot("current", &[("A", 1), ("X", 99)]);
    let exclusions: ExclusionSet = ["X", "Y"].into_iter().collect();
    let keys = KeySpec::default();

    // WHEN finding novel records
    let (novel, stats) = find_novel(&previous, &current, &exclusions, &keys)
        .unwrap()
        .collect_all()
        .unwrap();

    // THEN id=99 is excluded purely by partition
    assert!(novel.is_empty());
    assert_eq!(stats.excluded, 1);
    assert_eq!(stats.already_present, 1);
}

#[test]
fn test_scenario_c_new_identity_is_novel() {
    // GIVEN the Scenario A pair, where id=4 is new in partition A
    let (previous, current) = scenario_a();
    let keys = KeySpec::default();

    // WHEN finding novel records with no exclusions
    let ids: Vec<String> = find_novel(&previous, &current, &ExclusionSet::new(), &keys)
        .unwrap()
        .map(|n| n.unwrap().identity_key)
        .collect();

    // THEN id=4 is reported (and id=5 too)
    assert!(ids.contains(&"4".to_string()));
    assert!(ids.contains(&"5".to_string()));
    assert_eq!(ids.len(), 2);
}

#[test]
fn test_scenario_d_current_only_partition() {
    // GIVEN partition C exists only in current
    let previous = snapshot("previous", &[("A", 1)]);
    let current = snapshot("current", &[("A", 1), ("C", 7), ("C", 8)]);
    let keys = KeySpec::default();

    // WHEN comparing counts
    let previous_counts = aggregate(&previous, &keys).unwrap();
    let current_counts = aggregate(&current, &keys).unwrap();
    let report = compare_with_coverage(&previous_counts, &current_counts);

    // THEN C has no delta row but is listed as current-only
    assert!(report.rows.iter().all(|r| r.partition_key != "C"));
    assert_eq!(report.only_current, vec!["C".to_string()]);

    // AND its records are still novel
    let (novel, _) = find_novel(&previous, &current, &ExclusionSet::new(), &keys)
        .unwrap()
        .collect_all()
        .unwrap();
    assert_eq!(novel.len(), 2);
    assert!(novel.iter().all(|n| n.partition_key == "C"));
}

#[test]
fn test_empty_snapshots_produce_empty_report() {
    let empty = MemorySnapshot::default();
    let report = run_comparison(&empty, &empty, &DiffConfig::default()).unwrap();
    assert!(report.previous_counts.is_empty());
    assert!(report.delta.rows.is_empty());
    assert!(report.novel.is_empty());
    assert_eq!(report.novelty_stats.scanned, 0);
}

#[test]
fn test_shrinking_partition_has_negative_diff() {
    let previous = snapshot("previous", &[("A", 1), ("A", 2), ("A", 3)]);
    let current = snapshot("current", &[("A", 1)]);
    let report = run_comparison(&previous, &current, &DiffConfig::default()).unwrap();
    assert_eq!(report.delta.rows[0].diff, -2);
    assert!(report.novel.is_empty());
}

#[test]
fn test_variant_keys_with_chromosome_normalisation() {
    // GIVEN variant snapshots that spell chromosomes differently
    let previous = MemorySnapshot::from_records(
        "previous",
        vec![variant("chr1", 100, "A", "G"), variant("chrX", 5, "C", "T")],
    );
    let current = MemorySnapshot::from_records(
        "current",
        vec![
            variant("1", 100, "A", "G"),
            variant("x", 5, "C", "T"),
            variant("X", 6, "G", "A"),
            variant("chr2", 7, "T", "C"),
        ],
    );
    let config = DiffConfig::default()
        .with_keys(
            &KeySpec::new("chrom", ["chrom", "pos", "ref", "alt"]).with_normalized_partition(true),
        )
        .with_exclusions(["chrX"].into_iter().collect());

    // WHEN running the full comparison
    let report = run_comparison(&previous, &current, &config).unwrap();

    // THEN partitions line up after normalisation
    assert_eq!(report.delta.rows.len(), 2);
    assert_eq!(report.current_counts.get("X"), Some(2));

    // AND only the chr2 variant is novel; the new X variant is excluded
    assert_eq!(report.novel.len(), 1);
    assert_eq!(report.novel[0].identity_key, "2-7-T-C");
    assert_eq!(report.novelty_stats.excluded, 2);
}

#[test]
fn test_novel_records_keep_all_original_fields() {
    let previous = MemorySnapshot::default();
    let current = MemorySnapshot::from_records("current", vec![row("A", 1).with("note", "kept")]);
    let report = run_comparison(&previous, &current, &DiffConfig::default()).unwrap();
    assert_eq!(report.novel[0].record.get("note"), Some(&serde_json::json!("kept")));
    assert_eq!(report.novel[0].record.len(), 3);
}
