//! Human-readable summary renderer for comparison reports.

use crate::diff::report::ComparisonReport;
use crate::model::CountByKey;

/// Novel records listed individually before the summary switches to a count
const NOVEL_LISTING_LIMIT: usize = 20;

/// Render a Markdown summary of a [`ComparisonReport`]
///
/// Informational only; the structured report is the source of truth.
pub fn render_human_summary(report: &ComparisonReport) -> String {
    let mut out = String::new();

    out.push_str("## Snapshot Comparison\n\n");
    out.push_str(&format!(
        "**Request**: `{}`  \n**Generated**: {}  \n**Digest**: `{}`\n\n",
        report.request_id,
        report.generated_at,
        short(&report.report_digest)
    ));

    out.push_str(&format!(
        "- Previous: {} records in {} partitions\n- Current: {} records in {} partitions\n\n",
        report.previous_counts.total(),
        report.previous_counts.len(),
        report.current_counts.total(),
        report.current_counts.len(),
    ));

    // Delta
    out.push_str("### Partition Deltas\n\n");
    if report.delta.rows.is_empty() {
        out.push_str("_No partitions in common._\n\n");
    } else {
        out.push_str("| Partition | Previous | Current | Diff |\n|---|---:|---:|---:|\n");
        for row in &report.delta.rows {
            out.push_str(&format!(
                "| {} | {} | {} | {:+} |\n",
                row.partition_key, row.previous_count, row.current_count, row.diff
            ));
        }
        out.push('\n');
    }

    if !report.delta.only_previous.is_empty() {
        out.push_str(&format!(
            "- **Only in previous** ({}): {}\n",
            report.delta.only_previous.len(),
            report.delta.only_previous.join(", ")
        ));
    }
    if !report.delta.only_current.is_empty() {
        out.push_str(&format!(
            "- **Only in current** ({}): {}\n",
            report.delta.only_current.len(),
            report.delta.only_current.join(", ")
        ));
    }
    if !report.delta.only_previous.is_empty() || !report.delta.only_current.is_empty() {
        out.push('\n');
    }

    // Novelty
    let stats = &report.novelty_stats;
    out.push_str("### Novel Records\n\n");
    out.push_str(&format!(
        "Scanned {}, excluded {}, already present {}, novel {}.\n\n",
        stats.scanned, stats.excluded, stats.already_present, stats.novel
    ));
    for novel in report.novel.iter().take(NOVEL_LISTING_LIMIT) {
        out.push_str(&format!(
            "- `{}` (partition {})\n",
            novel.identity_key, novel.partition_key
        ));
    }
    if report.novel.len() > NOVEL_LISTING_LIMIT {
        out.push_str(&format!(
            "- _... and {} more_\n",
            report.novel.len() - NOVEL_LISTING_LIMIT
        ));
    }

    out
}

/// Render per-partition counts as a two-column Markdown table
pub fn render_counts(counts: &CountByKey) -> String {
    let mut out = String::from("| Partition | Count |\n|---|---:|\n");
    for (key, count) in counts.iter() {
        out.push_str(&format!("| {} | {} |\n", key, count));
    }
    out.push_str(&format!("| **Total** | {} |\n", counts.total()));
    out
}

/// First 12 characters of a digest
fn short(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}
