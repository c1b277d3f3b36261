use anyhow::{Context, Result};
use octocrab::Octocrab;

use crate::config::Settings;

/// Build the authenticated client for the run. Standard proxy variables
/// (HTTP_PROXY/HTTPS_PROXY) are honored by the underlying transport.
pub fn create_client(settings: &Settings) -> Result<Octocrab> {
    Octocrab::builder()
        .personal_token(settings.token.clone())
        .build()
        .with_context(|| format!("Failed to create GitHub client for {}", settings.repo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoId;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_create_client_with_token() {
        // Idempotent across tests; the provider may already be installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let settings = Settings {
            token: "ghp_test".to_string(),
            repo: RepoId::parse("owner/repo").unwrap(),
            main_branch: "main".to_string(),
            csv_path: None,
            plot_path: PathBuf::from("p.png"),
            no_plot: false,
        };
        assert!(create_client(&settings).is_ok());
    }
}
