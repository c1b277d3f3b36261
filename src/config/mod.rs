use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// A GitHub repository identifier in `owner/repo` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    /// Parse "owner/repo". Anything else is rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('/').filter(|p| !p.is_empty()).collect();
        if parts.len() != 2 {
            bail!("Invalid repository '{}'. Expected owner/repo.", s);
        }
        Ok(RepoId {
            owner: parts[0].to_string(),
            repo: parts[1].to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Fully resolved run configuration. Command-line flags win over environment
/// variables; the environment is read after loading a `.env` file if one is
/// present.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub repo: RepoId,
    pub main_branch: String,
    pub csv_path: Option<PathBuf>,
    pub plot_path: PathBuf,
    pub no_plot: bool,
}

/// Resolve settings from flags and environment. Fails fast on a missing
/// token or repository so no network call is ever attempted with a bad
/// configuration.
pub fn resolve(
    repo_flag: Option<&str>,
    branch_flag: Option<&str>,
    csv_path: Option<PathBuf>,
    plot_path: PathBuf,
    no_plot: bool,
) -> Result<Settings> {
    // Best effort; a missing .env file is not an error.
    dotenvy::dotenv().ok();

    let token = env::var("GITHUB_TOKEN")
        .context("GITHUB_TOKEN is not set. Export it or add it to a .env file.")?;
    if token.trim().is_empty() {
        bail!("GITHUB_TOKEN is set but empty.");
    }

    let repo_str = match repo_flag {
        Some(r) => r.to_string(),
        None => env::var("REPO_NAME")
            .context("No repository given. Pass --repo owner/repo or set REPO_NAME.")?,
    };
    let repo = RepoId::parse(&repo_str)?;

    let main_branch = match branch_flag {
        Some(b) => b.to_string(),
        None => env::var("MAIN_BRANCH").unwrap_or_else(|_| "main".to_string()),
    };

    Ok(Settings {
        token,
        repo,
        main_branch,
        csv_path,
        plot_path,
        no_plot,
    })
}
