use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::github::types::PullRequestRecord;

/// Derived triage metrics for one pull request.
#[derive(Debug, Clone)]
pub struct PrMetrics {
    pub lines_changed: u64,
    pub total_comments: u64,
    pub time_open: Duration,
    pub is_merged: bool,
    pub author_pr_count: usize,
}

/// A raw record together with its derived metrics.
#[derive(Debug, Clone)]
pub struct AnalyzedPr {
    pub record: PullRequestRecord,
    pub metrics: PrMetrics,
}

impl AnalyzedPr {
    /// Time open as fractional days, the unit used by the CSV and the plot.
    pub fn time_open_days(&self) -> f64 {
        self.metrics.time_open.num_seconds() as f64 / 86_400.0
    }
}

/// Derive metrics for the whole fetched set. Two passes: author activity
/// needs the complete set before any per-record derivation can run.
/// Pure and deterministic given `now`.
pub fn derive_all(records: Vec<PullRequestRecord>, now: DateTime<Utc>) -> Vec<AnalyzedPr> {
    let mut author_counts: HashMap<String, usize> = HashMap::new();
    for record in &records {
        *author_counts.entry(record.author.clone()).or_insert(0) += 1;
    }

    records
        .into_iter()
        .map(|record| {
            let metrics = derive_one(&record, &author_counts, now);
            AnalyzedPr { record, metrics }
        })
        .collect()
}

fn derive_one(
    record: &PullRequestRecord,
    author_counts: &HashMap<String, usize>,
    now: DateTime<Utc>,
) -> PrMetrics {
    // Open PRs keep aging: the interval ends at `now` until closed_at lands.
    let end = record.closed_at.unwrap_or(now);
    let time_open = std::cmp::max(end - record.created_at, Duration::zero());

    PrMetrics {
        lines_changed: record.additions + record.deletions,
        total_comments: record.comments + record.review_comments,
        time_open,
        is_merged: record.merged_at.is_some(),
        author_pr_count: *author_counts.get(&record.author).unwrap_or(&1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(number: u64, author: &str) -> PullRequestRecord {
        PullRequestRecord {
            number,
            title: format!("PR #{}", number),
            author: author.to_string(),
            created_at: Utc::now() - Duration::days(2),
            closed_at: None,
            merged_at: None,
            additions: 10,
            deletions: 5,
            changed_files: 3,
            comments: 1,
            review_comments: 2,
            labels: vec![],
            commits_ahead: 4,
            commits_behind: 7,
        }
    }

    #[test]
    fn test_lines_changed_is_additions_plus_deletions() {
        let mut record = sample_record(1, "octocat");
        record.additions = 120;
        record.deletions = 30;
        let analyzed = derive_all(vec![record], Utc::now());
        assert_eq!(analyzed[0].metrics.lines_changed, 150);
    }

    #[test]
    fn test_total_comments_is_both_comment_kinds() {
        let mut record = sample_record(1, "octocat");
        record.comments = 4;
        record.review_comments = 6;
        let analyzed = derive_all(vec![record], Utc::now());
        assert_eq!(analyzed[0].metrics.total_comments, 10);
    }

    #[test]
    fn test_merged_flag_follows_merged_at() {
        let now = Utc::now();
        let mut merged = sample_record(1, "octocat");
        merged.merged_at = Some(now - Duration::hours(1));
        merged.closed_at = Some(now - Duration::hours(1));
        let open = sample_record(2, "octocat");

        let analyzed = derive_all(vec![merged, open], now);
        assert!(analyzed[0].metrics.is_merged);
        assert!(!analyzed[1].metrics.is_merged);
    }

    #[test]
    fn test_open_pr_ages_until_now() {
        let now = Utc::now();
        let mut record = sample_record(1, "octocat");
        record.created_at = now - Duration::days(10);
        record.closed_at = None;

        let analyzed = derive_all(vec![record], now);
        assert_eq!(analyzed[0].metrics.time_open, Duration::days(10));
        assert!((analyzed[0].time_open_days() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_closed_pr_uses_closed_at() {
        let now = Utc::now();
        let mut record = sample_record(1, "octocat");
        record.created_at = now - Duration::days(10);
        record.closed_at = Some(now - Duration::days(3));

        let analyzed = derive_all(vec![record], now);
        assert_eq!(analyzed[0].metrics.time_open, Duration::days(7));
    }

    #[test]
    fn test_time_open_clamped_at_zero() {
        let now = Utc::now();
        let mut record = sample_record(1, "octocat");
        // Clock skew: created after the recorded close.
        record.created_at = now;
        record.closed_at = Some(now - Duration::seconds(30));

        let analyzed = derive_all(vec![record], now);
        assert_eq!(analyzed[0].metrics.time_open, Duration::zero());
    }

    #[test]
    fn test_author_pr_count_across_the_set() {
        let records = vec![
            sample_record(1, "alice"),
            sample_record(2, "alice"),
            sample_record(3, "bob"),
        ];
        let analyzed = derive_all(records, Utc::now());

        assert_eq!(analyzed[0].metrics.author_pr_count, 2);
        assert_eq!(analyzed[1].metrics.author_pr_count, 2);
        assert_eq!(analyzed[2].metrics.author_pr_count, 1);
    }

    #[test]
    fn test_every_record_counts_itself() {
        let records: Vec<_> = (1..=5)
            .map(|n| sample_record(n, &format!("author-{}", n)))
            .collect();
        for analyzed in derive_all(records, Utc::now()) {
            assert!(analyzed.metrics.author_pr_count >= 1);
        }
    }

    #[test]
    fn test_scenario_ten_day_open_pr() {
        let now = Utc::now();
        let mut record = sample_record(42, "octocat");
        record.additions = 120;
        record.deletions = 30;
        record.comments = 4;
        record.review_comments = 6;
        record.merged_at = None;
        record.closed_at = None;
        record.created_at = now - Duration::days(10);

        let analyzed = derive_all(vec![record], now);
        let m = &analyzed[0].metrics;
        assert_eq!(m.lines_changed, 150);
        assert_eq!(m.total_comments, 10);
        assert!(!m.is_merged);
        assert_eq!(m.time_open.num_days(), 10);
    }

    #[test]
    fn test_empty_set() {
        assert!(derive_all(vec![], Utc::now()).is_empty());
    }
}
