//! Property-based tests for the comparison invariants.
//!
//! Snapshots are generated as lists of `(partition, id)` pairs drawn from
//! small alphabets so that partitions and identities overlap between the
//! two sides often enough to matter.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;

use common::row;
use snapdelta_core::config::DiffConfig;
use snapdelta_core::diff::{aggregate, compare, find_novel, run_comparison};
use snapdelta_core::model::{ExclusionSet, KeySpec};
use snapdelta_core::snapshot::MemorySnapshot;

fn arb_partition() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["1", "2", "3", "X", "Y", "MT"]).prop_map(String::from)
}

fn arb_rows() -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::vec((arb_partition(), 0u64..40), 0..60)
}

fn arb_exclusions() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(arb_partition(), 0..3)
}

fn build(label: &str, rows: &[(String, u64)]) -> MemorySnapshot {
    MemorySnapshot::from_records(label, rows.iter().map(|(p, id)| row(p, *id)))
}

proptest! {
    #[test]
    fn prop_count_conservation(rows in arb_rows()) {
        let snapshot = build("s", &rows);
        let counts = aggregate(&snapshot, &KeySpec::default()).unwrap();
        prop_assert_eq!(counts.total(), rows.len() as u64);
        prop_assert!(counts.iter().all(|(_, c)| c > 0));
    }

    #[test]
    fn prop_inner_join_correctness(prev in arb_rows(), curr in arb_rows()) {
        let keys = KeySpec::default();
        let previous = aggregate(&build("p", &prev), &keys).unwrap();
        let current = aggregate(&build("c", &curr), &keys).unwrap();
        let rows = compare(&previous, &current);

        for key in previous.keys().filter(|k| current.contains_key(k)) {
            let matching: Vec<_> = rows.iter().filter(|r| r.partition_key == key).collect();
            prop_assert_eq!(matching.len(), 1);
            let expected = current.get(key).unwrap() as i64 - previous.get(key).unwrap() as i64;
            prop_assert_eq!(matching[0].diff, expected);
        }
    }

    #[test]
    fn prop_no_orphan_deltas(prev in arb_rows(), curr in arb_rows()) {
        let keys = KeySpec::default();
        let previous = aggregate(&build("p", &prev), &keys).unwrap();
        let current = aggregate(&build("c", &curr), &keys).unwrap();
        for row in compare(&previous, &current) {
            prop_assert!(previous.contains_key(&row.partition_key));
            prop_assert!(current.contains_key(&row.partition_key));
        }
    }

    #[test]
    fn prop_novelty_exclusivity(prev in arb_rows(), curr in arb_rows(), excluded in arb_exclusions()) {
        let keys = KeySpec::default();
        let exclusions: ExclusionSet = excluded.iter().cloned().collect();
        let previous = build("p", &prev);
        let current = build("c", &curr);

        let previous_ids: HashSet<String> = prev.iter().map(|(_, id)| id.to_string()).collect();
        let expected: Vec<String> = curr
            .iter()
            .filter(|(p, id)| !excluded.contains(p) && !previous_ids.contains(&id.to_string()))
            .map(|(_, id)| id.to_string())
            .collect();

        let actual: Vec<String> = find_novel(&previous, &current, &exclusions, &keys)
            .unwrap()
            .map(|n| n.unwrap().identity_key)
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_idempotence(prev in arb_rows(), curr in arb_rows()) {
        let previous = build("p", &prev);
        let current = build("c", &curr);
        let config = DiffConfig::default();

        let first = run_comparison(&previous, &current, &config).unwrap();
        let second = run_comparison(&previous, &current, &config).unwrap();

        prop_assert_eq!(&first.delta, &second.delta);
        let ids = |r: &snapdelta_core::ComparisonReport| -> BTreeSet<String> {
            r.novel.iter().map(|n| n.identity_key.clone()).collect()
        };
        prop_assert_eq!(ids(&first), ids(&second));
        prop_assert_eq!(first.report_digest, second.report_digest);
    }
}
