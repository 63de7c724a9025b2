//! Integration tests for comparing snapshots stored as SQLite tables
//!
//! Covers TSV import, table passes, the comparison pipeline and SQL pushdown

use rusqlite::Connection;
use snapdelta_core::config::DiffConfig;
use snapdelta_core::diff::{aggregate, run_comparison};
use snapdelta_core::errors::ExErrorKind;
use snapdelta_core::model::KeySpec;
use snapdelta_store::{count_by_partition, import_tsv, SqliteTable};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn setup_test_db() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    for (table, file) in [("previous", "previous.tsv"), ("current", "current.tsv")] {
        let reader = BufReader::new(File::open(fixtures_dir().join(file)).unwrap());
        import_tsv(&mut conn, table, reader).unwrap();
    }
    conn
}

fn variant_config() -> DiffConfig {
    DiffConfig::from_toml_str(
        r#"
[keys]
partition = "CHROM"
identity = ["CHROM", "POS", "REF", "ALT"]
normalize_partition = true

[novelty]
exclusions = ["X", "Y"]
"#,
    )
    .unwrap()
}

#[test]
fn test_fixture_import_row_counts() {
    let conn = setup_test_db();
    assert_eq!(SqliteTable::open(&conn, "previous").unwrap().row_count().unwrap(), 5);
    assert_eq!(SqliteTable::open(&conn, "current").unwrap().row_count().unwrap(), 8);
}

#[test]
fn test_compare_tables_end_to_end() {
    // Given: both fixtures imported
    let conn = setup_test_db();
    let previous = SqliteTable::open(&conn, "previous").unwrap();
    let current = SqliteTable::open(&conn, "current").unwrap();

    // When: the full comparison runs
    let report = run_comparison(&previous, &current, &variant_config()).unwrap();

    // Then: chromosome spellings line up
    assert_eq!(report.previous_counts.get("1"), Some(2));
    assert_eq!(report.current_counts.get("1"), Some(3));
    let rows: Vec<(&str, i64)> = report
        .delta
        .rows
        .iter()
        .map(|r| (r.partition_key.as_str(), r.diff))
        .collect();
    assert_eq!(rows, vec![("1", 1), ("2", 0), ("X", 1), ("Y", 0)]);
    assert_eq!(report.delta.only_current, vec!["MT".to_string()]);

    // And: excluded chromosomes never show up as novel
    let novel: Vec<&str> = report.novel.iter().map(|n| n.identity_key.as_str()).collect();
    assert_eq!(novel, vec!["1-3000-G-T", "MT-10-A-G"]);
    assert_eq!(report.novelty_stats.excluded, 3);
    assert_eq!(report.novelty_stats.already_present, 3);
    assert_eq!(report.novelty_stats.scanned, 8);

    // And: the novel record carries every column
    assert_eq!(
        report.novel[0].record.get("ID"),
        Some(&serde_json::json!("."))
    );
}

#[test]
fn test_pushdown_matches_aggregate_on_fixtures() {
    let conn = setup_test_db();
    for table in ["previous", "current"] {
        let source = SqliteTable::open(&conn, table).unwrap();
        let in_rust = aggregate(&source, &KeySpec::new("CHROM", ["POS"])).unwrap();
        let in_sql = count_by_partition(&conn, table, "CHROM").unwrap();
        assert_eq!(in_rust, in_sql, "mismatch for table {}", table);
    }
}

#[test]
fn test_null_partition_fails_comparison() {
    let conn = setup_test_db();
    conn.execute("INSERT INTO current (CHROM, POS, REF, ALT) VALUES (NULL, '1', 'A', 'C')", [])
        .unwrap();
    let previous = SqliteTable::open(&conn, "previous").unwrap();
    let current = SqliteTable::open(&conn, "current").unwrap();

    let err = run_comparison(&previous, &current, &variant_config()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::MalformedRecord);
    assert_eq!(err.record_index(), Some(8));
    assert_eq!(err.entity_id(), Some("CHROM"));
}
