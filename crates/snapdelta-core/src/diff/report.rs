//! Comparison report and its digest.
//!
//! ## Digest
//!
//! `report_digest` is a SHA-256 over the canonical JSON of the report's
//! semantic content:
//!
//! - schema version
//! - both count maps
//! - delta rows in ascending partition-key order, plus the uncovered keys
//! - novel identity keys, sorted
//! - novelty counters
//!
//! `generated_at` and `request_id` are left out, so two runs over the same
//! inputs produce the same digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use snapdelta_core_types::RequestId;

use crate::errors::{ExError, SnapDeltaError};
use crate::model::{CountByKey, DeltaReport, DeltaRow, NoveltyRecord, NoveltyStats};

/// Current report layout version
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Full result of comparing two snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub report_schema_version: u32,
    /// RFC 3339 timestamp of report assembly
    pub generated_at: String,
    pub request_id: RequestId,
    pub previous_counts: CountByKey,
    pub current_counts: CountByKey,
    pub delta: DeltaReport,
    /// Novel records in scan order
    pub novel: Vec<NoveltyRecord>,
    pub novelty_stats: NoveltyStats,
    /// Hex SHA-256 of the semantic content
    pub report_digest: String,
}

#[derive(Serialize)]
struct SemanticContent<'a> {
    report_schema_version: u32,
    previous_counts: &'a CountByKey,
    current_counts: &'a CountByKey,
    delta_rows: Vec<&'a DeltaRow>,
    only_previous: &'a [String],
    only_current: &'a [String],
    novel_identity_keys: Vec<&'a str>,
    novelty_stats: &'a NoveltyStats,
}

impl ComparisonReport {
    /// Assemble a report, stamping the time and computing the digest
    ///
    /// # Errors
    ///
    /// `Serialization` if the digest input cannot be encoded.
    pub fn assemble(
        request_id: RequestId,
        previous_counts: CountByKey,
        current_counts: CountByKey,
        delta: DeltaReport,
        novel: Vec<NoveltyRecord>,
        novelty_stats: NoveltyStats,
    ) -> Result<Self, ExError> {
        let mut report = Self {
            report_schema_version: REPORT_SCHEMA_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            request_id,
            previous_counts,
            current_counts,
            delta,
            novel,
            novelty_stats,
            report_digest: String::new(),
        };
        report.report_digest = compute_report_digest(&report)?;
        Ok(report)
    }

    /// Recompute the digest and compare it with the stored one
    ///
    /// # Errors
    ///
    /// `Serialization` if the digest input cannot be encoded.
    pub fn verify_digest(&self) -> Result<bool, ExError> {
        Ok(compute_report_digest(self)? == self.report_digest)
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// `Serialization` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, ExError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ExError::from(SnapDeltaError::from(e)).with_op("render_report_json"))
    }

    /// Number of delta rows whose count changed
    pub fn changed_partitions(&self) -> usize {
        self.delta.rows.iter().filter(|row| row.diff != 0).count()
    }
}

/// Digest of a report's semantic content
///
/// # Errors
///
/// `Serialization` if the content cannot be encoded.
pub fn compute_report_digest(report: &ComparisonReport) -> Result<String, ExError> {
    let mut delta_rows: Vec<&DeltaRow> = report.delta.rows.iter().collect();
    delta_rows.sort_by(|a, b| a.partition_key.cmp(&b.partition_key));

    let mut novel_identity_keys: Vec<&str> = report
        .novel
        .iter()
        .map(|n| n.identity_key.as_str())
        .collect();
    novel_identity_keys.sort_unstable();

    let content = SemanticContent {
        report_schema_version: report.report_schema_version,
        previous_counts: &report.previous_counts,
        current_counts: &report.current_counts,
        delta_rows,
        only_previous: &report.delta.only_previous,
        only_current: &report.delta.only_current,
        novel_identity_keys,
        novelty_stats: &report.novelty_stats,
    };

    let canonical = serde_json::to_string(&content)
        .map_err(|e| ExError::from(SnapDeltaError::from(e)).with_op("compute_report_digest"))?;
    Ok(hash_string(&canonical))
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn sample(request_id: RequestId) -> ComparisonReport {
        let previous: CountByKey = [("A".to_string(), 2), ("B".to_string(), 1)]
            .into_iter()
            .collect();
        let current: CountByKey = [("A".to_string(), 3), ("C".to_string(), 1)]
            .into_iter()
            .collect();
        let delta = DeltaReport {
            rows: vec![DeltaRow::new("A".to_string(), 2, 3)],
            only_previous: vec!["B".to_string()],
            only_current: vec!["C".to_string()],
        };
        let novel = vec![NoveltyRecord {
            identity_key: "7".to_string(),
            partition_key: "C".to_string(),
            record: Record::new().with("identity_key", 7).with("partition_key", "C"),
        }];
        let stats = NoveltyStats {
            scanned: 4,
            excluded: 0,
            already_present: 3,
            novel: 1,
        };
        ComparisonReport::assemble(request_id, previous, current, delta, novel, stats).unwrap()
    }

    #[test]
    fn test_digest_ignores_time_and_request_id() {
        let a = sample(RequestId::new());
        let mut b = sample(RequestId::new());
        b.generated_at = "2001-01-01T00:00:00+00:00".to_string();
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.report_digest, b.report_digest);
        assert!(b.verify_digest().unwrap());
    }

    #[test]
    fn test_digest_detects_semantic_change() {
        let mut report = sample(RequestId::new());
        assert_eq!(report.report_digest.len(), 64);
        report.novelty_stats.novel = 2;
        assert!(!report.verify_digest().unwrap());
    }

    #[test]
    fn test_digest_independent_of_row_order() {
        let mut report = sample(RequestId::new());
        report.delta.rows.push(DeltaRow::new("0".to_string(), 1, 1));
        let before = compute_report_digest(&report).unwrap();
        report.delta.rows.reverse();
        assert_eq!(compute_report_digest(&report).unwrap(), before);
    }

    #[test]
    fn test_json_has_schema_version_and_rfc3339_time() {
        let report = sample(RequestId::new());
        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["report_schema_version"], 1);
        let generated = json["generated_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(generated).is_ok());
        assert_eq!(report.changed_partitions(), 1);
    }
}
