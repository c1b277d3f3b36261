use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Raw per-PR data assembled from the list, detail, and compare endpoints.
/// One record per pull request, never mutated after the fetch completes.
#[derive(Debug, Clone)]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub additions: u64,       // Lines added
    pub deletions: u64,       // Lines deleted
    pub changed_files: u64,
    pub comments: u64,        // Issue-level comments
    pub review_comments: u64, // Inline review comments
    pub labels: Vec<String>,
    pub commits_ahead: u64,   // Commits the PR branch has that main lacks
    pub commits_behind: u64,  // Commits main has that the PR branch lacks
}

/// The slice of the `/compare/{base}...{head}` response we consume.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BranchComparison {
    pub ahead_by: u64,
    pub behind_by: u64,
}
