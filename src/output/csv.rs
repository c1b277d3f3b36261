use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::metrics::AnalyzedPr;

/// One CSV row: every raw field plus the derived columns, flattened.
/// Labels are joined with `;` so the row stays a flat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub comments: u64,
    pub review_comments: u64,
    pub labels: String,
    pub commits_ahead: u64,
    pub commits_behind: u64,
    pub lines_changed: u64,
    pub total_comments: u64,
    pub time_open_days: f64,
    pub is_merged: bool,
    pub author_pr_count: usize,
}

impl From<&AnalyzedPr> for CsvRow {
    fn from(pr: &AnalyzedPr) -> Self {
        CsvRow {
            number: pr.record.number,
            title: pr.record.title.clone(),
            author: pr.record.author.clone(),
            created_at: pr.record.created_at,
            closed_at: pr.record.closed_at,
            merged_at: pr.record.merged_at,
            additions: pr.record.additions,
            deletions: pr.record.deletions,
            changed_files: pr.record.changed_files,
            comments: pr.record.comments,
            review_comments: pr.record.review_comments,
            labels: pr.record.labels.join(";"),
            commits_ahead: pr.record.commits_ahead,
            commits_behind: pr.record.commits_behind,
            lines_changed: pr.metrics.lines_changed,
            total_comments: pr.metrics.total_comments,
            time_open_days: pr.time_open_days(),
            is_merged: pr.metrics.is_merged,
            author_pr_count: pr.metrics.author_pr_count,
        }
    }
}

/// Column names, in `CsvRow` field order. `serialize` emits the same header
/// before the first row; this list exists so an empty set still gets one.
const COLUMNS: [&str; 19] = [
    "number",
    "title",
    "author",
    "created_at",
    "closed_at",
    "merged_at",
    "additions",
    "deletions",
    "changed_files",
    "comments",
    "review_comments",
    "labels",
    "commits_ahead",
    "commits_behind",
    "lines_changed",
    "total_comments",
    "time_open_days",
    "is_merged",
    "author_pr_count",
];

/// Write the full record set to a CSV file with a header row. Called only
/// after fetch and derivation both succeeded, so a partial file is never
/// left behind.
pub fn write_csv(path: &Path, prs: &[AnalyzedPr]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file at {}", path.display()))?;
    if prs.is_empty() {
        writer
            .write_record(COLUMNS)
            .context("Failed to write CSV header")?;
    }
    for pr in prs {
        writer
            .serialize(CsvRow::from(pr))
            .with_context(|| format!("Failed to write CSV row for PR #{}", pr.record.number))?;
    }
    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

/// Read back a CSV written by `write_csv`.
pub fn read_csv(path: &Path) -> Result<Vec<CsvRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file at {}", path.display()))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<CsvRow>, _>>()
        .context("Failed to parse CSV row")
}
