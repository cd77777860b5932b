use anyhow::{Context, Result};

use crate::{config::Config, release::GitHubReleases, runtime::Runtime};

/// Checks configuration and API access.
#[tracing::instrument(skip(runtime, api_url))]
pub async fn verify<R: Runtime>(
    runtime: &R,
    repo: Option<&str>,
    api_url: Option<String>,
) -> Result<()> {
    let config = Config::load(runtime, repo, api_url)?;
    let github = GitHubReleases::from_config(&config)?;
    let identity = github
        .verify_access()
        .await
        .context("Cannot access the GitHub API")?;
    println!("GitHub access OK for {} as {}", config.repo, identity.login);
    Ok(())
}
