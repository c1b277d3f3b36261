use anyhow::Result;
use chrono::Utc;
use octocrab::Octocrab;

use crate::config::Settings;
use crate::github;
use crate::metrics::{derive_all, AnalyzedPr};

/// Fetch every PR of the configured repository and derive its metrics.
///
/// Derivation runs only after the whole set is in memory: author activity
/// is a cross-record aggregate. The result is sorted by PR number ascending
/// so output order is stable regardless of API return order.
pub async fn run(
    client: &Octocrab,
    settings: &Settings,
    verbose: bool,
) -> Result<Vec<AnalyzedPr>> {
    let records = github::fetch_repository_prs(
        client,
        &settings.repo,
        &settings.main_branch,
        verbose,
    )
    .await?;

    let mut analyzed = derive_all(records, Utc::now());
    analyzed.sort_by_key(|pr| pr.record.number);
    Ok(analyzed)
}
