use anyhow::{Context, Result};
use octocrab::models::pulls::PullRequest as ApiPullRequest;
use octocrab::Octocrab;
use std::fmt;
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use crate::config::RepoId;
use crate::github::types::{BranchComparison, PullRequestRecord};

/// Retry strategy for individual API calls: exponential backoff, 3 attempts.
fn retry_strategy() -> impl Iterator<Item = std::time::Duration> {
    ExponentialBackoff::from_millis(100)
        .max_delay(std::time::Duration::from_secs(5))
        .take(3)
}

/// Coarse classification of API failures; drives the exit code in main.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Auth,
    NotFound,
    RateLimit,
    Other,
}

/// An API failure with a message a user can act on. Survives anyhow context
/// wrapping, so callers can downcast to recover the kind.
#[derive(Debug)]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
}

impl ApiError {
    fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

fn classify_api_error(e: octocrab::Error) -> ApiError {
    classify_error_text(&format!("{:?}", e), &e.to_string())
}

/// Classification is by substring because octocrab surfaces GitHub's error
/// body as text; the matched phrases are the stable parts of those bodies.
fn classify_error_text(error_str: &str, display: &str) -> ApiError {
    if error_str.contains("do not have permission")
        || error_str.contains("resources do not exist")
        || error_str.contains("Not Found")
    {
        ApiError::new(
            ApiErrorKind::NotFound,
            "Repository or branch not found, or no access. Check the repo name, branch name, and token permissions (needs 'repo' scope for private repos).",
        )
    } else if error_str.contains("401") || error_str.contains("Bad credentials") {
        ApiError::new(
            ApiErrorKind::Auth,
            "Authentication failed. Your GitHub token may be invalid or expired.",
        )
    } else if error_str.contains("rate limit") || error_str.contains("403") {
        ApiError::new(
            ApiErrorKind::RateLimit,
            "GitHub API rate limit exceeded. Wait a few minutes and try again.",
        )
    } else {
        ApiError::new(ApiErrorKind::Other, format!("GitHub API error: {}", display))
    }
}

/// List every pull request in the repository (open, closed, and merged),
/// following pagination until the API is exhausted.
async fn list_pull_requests(client: &Octocrab, repo: &RepoId) -> Result<Vec<ApiPullRequest>> {
    let mut page = Retry::spawn(retry_strategy(), || async {
        client
            .pulls(repo.owner.as_str(), repo.repo.as_str())
            .list()
            .state(octocrab::params::State::All)
            .per_page(100)
            .send()
            .await
            .map_err(classify_api_error)
    })
    .await?;

    let mut prs = page.take_items();

    loop {
        let next = Retry::spawn(retry_strategy(), || async {
            client
                .get_page::<ApiPullRequest>(&page.next)
                .await
                .map_err(classify_api_error)
        })
        .await?;

        match next {
            Some(next_page) => {
                page = next_page;
                prs.extend(page.take_items());
            }
            None => break,
        }
    }

    Ok(prs)
}

/// Fetch the full PR object. The list endpoint omits additions, deletions,
/// changed_files, and the comment counts.
async fn fetch_pr_detail(
    client: &Octocrab,
    repo: &RepoId,
    number: u64,
) -> Result<ApiPullRequest> {
    Retry::spawn(retry_strategy(), || async {
        client
            .pulls(repo.owner.as_str(), repo.repo.as_str())
            .get(number)
            .await
            .map_err(classify_api_error)
    })
    .await
    .with_context(|| format!("Failed to fetch details for PR #{}", number))
}

/// Compare the PR branch against the configured base branch. The counts are
/// taken against the current tip of the base, not its state when the PR was
/// opened.
async fn compare_with_base(
    client: &Octocrab,
    repo: &RepoId,
    base: &str,
    head: &str,
) -> Result<BranchComparison> {
    let route = format!(
        "/repos/{}/{}/compare/{}...{}",
        repo.owner, repo.repo, base, head
    );
    Retry::spawn(retry_strategy(), || async {
        client
            .get(&route, None::<&()>)
            .await
            .map_err(classify_api_error)
    })
    .await
    .with_context(|| format!("Failed to compare {}...{}", base, head))
}

/// Fork PRs need the owner-qualified label for the compare endpoint.
fn head_ref(pr: &ApiPullRequest) -> String {
    qualified_head(pr.head.label.as_deref(), &pr.head.ref_field)
}

fn qualified_head(label: Option<&str>, ref_field: &str) -> String {
    label.unwrap_or(ref_field).to_string()
}

fn build_record(
    pr: ApiPullRequest,
    detail: ApiPullRequest,
    comparison: BranchComparison,
) -> Result<PullRequestRecord> {
    let created_at = pr
        .created_at
        .with_context(|| format!("PR #{} is missing created_at", pr.number))?;
    let author = pr
        .user
        .as_ref()
        .map(|u| u.login.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let labels = pr
        .labels
        .unwrap_or_default()
        .into_iter()
        .map(|l| l.name)
        .collect();

    Ok(PullRequestRecord {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        author,
        created_at,
        closed_at: pr.closed_at,
        merged_at: pr.merged_at,
        additions: detail.additions.unwrap_or(0) as u64,
        deletions: detail.deletions.unwrap_or(0) as u64,
        changed_files: detail.changed_files.unwrap_or(0) as u64,
        comments: detail.comments.unwrap_or(0) as u64,
        review_comments: detail.review_comments.unwrap_or(0) as u64,
        labels,
        commits_ahead: comparison.ahead_by,
        commits_behind: comparison.behind_by,
    })
}

/// Fetch every PR of the repository with its detail and branch-comparison
/// data, one PR at a time. Any error aborts the whole fetch; callers never
/// see a partial set.
pub async fn fetch_repository_prs(
    client: &Octocrab,
    repo: &RepoId,
    main_branch: &str,
    verbose: bool,
) -> Result<Vec<PullRequestRecord>> {
    let listed = list_pull_requests(client, repo).await?;
    let total = listed.len();
    if verbose {
        eprintln!("Listed {} pull requests in {}", total, repo);
    }

    let mut records = Vec::with_capacity(total);
    for (i, pr) in listed.into_iter().enumerate() {
        let number = pr.number;
        if verbose {
            eprintln!("  [{}/{}] PR #{}: fetching detail and comparison", i + 1, total, number);
        }
        let detail = fetch_pr_detail(client, repo, number).await?;
        let comparison =
            compare_with_base(client, repo, main_branch, &head_ref(&pr)).await?;
        records.push(build_record(pr, detail, comparison)?);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_head_prefers_fork_label() {
        assert_eq!(
            qualified_head(Some("forker:feature"), "feature"),
            "forker:feature"
        );
    }

    #[test]
    fn test_qualified_head_falls_back_to_ref() {
        assert_eq!(qualified_head(None, "feature"), "feature");
    }

    #[test]
    fn test_classify_auth_error() {
        let err = classify_error_text("GitHub { status: 401, message: \"Bad credentials\" }", "x");
        assert_eq!(err.kind(), ApiErrorKind::Auth);
        assert!(err.to_string().contains("Authentication failed"));
    }

    #[test]
    fn test_classify_not_found_error() {
        let err = classify_error_text("resources do not exist or you do not have permission", "x");
        assert_eq!(err.kind(), ApiErrorKind::NotFound);
    }

    #[test]
    fn test_classify_rate_limit_error() {
        let err = classify_error_text("GitHub { status: 403, message: \"API rate limit exceeded\" }", "x");
        assert_eq!(err.kind(), ApiErrorKind::RateLimit);
    }

    #[test]
    fn test_classify_other_error_keeps_display() {
        let err = classify_error_text("Serde { source: ... }", "data did not match");
        assert_eq!(err.kind(), ApiErrorKind::Other);
        assert!(err.to_string().contains("data did not match"));
    }

    #[test]
    fn test_error_kind_survives_anyhow_context() {
        let err = anyhow::Error::from(ApiError::new(
            ApiErrorKind::Auth,
            "Authentication failed. Your GitHub token may be invalid or expired.",
        ))
        .context("Failed to fetch details for PR #1");

        let kind = err.downcast_ref::<ApiError>().map(|e| e.kind());
        assert_eq!(kind, Some(ApiErrorKind::Auth));
    }
}
