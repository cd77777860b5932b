use anyhow::{Context, Result};

use crate::{
    config::Config,
    release::{GitHubReleases, ReleaseApi, reconcile},
    runtime::Runtime,
};

use super::{connect, report};

/// Tag, title and body of one release.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseInput {
    pub tag_name: String,
    /// Release title; the tag is used when absent.
    pub name: Option<String>,
    pub message: String,
}

impl ReleaseInput {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.tag_name)
    }
}

/// Creates a release without looking for an existing one.
///
/// This is the deploy-time path: the tag was just pushed, so there is nothing
/// to update. A refused create prints manual instructions and still succeeds.
#[tracing::instrument(skip(runtime, api_url, input), fields(tag = %input.tag_name))]
pub async fn create<R: Runtime>(
    runtime: &R,
    repo: Option<&str>,
    api_url: Option<String>,
    input: &ReleaseInput,
) -> Result<()> {
    let config = Config::load(runtime, repo, api_url)?;
    let github = GitHubReleases::from_config(&config)?;

    println!("Creating GitHub release {}.", input.tag_name);
    report(
        github
            .create_release(&input.tag_name, input.name(), &input.message)
            .await,
    );
    Ok(())
}

/// Updates the release for the tag, or creates it.
#[tracing::instrument(skip(runtime, api_url, input), fields(tag = %input.tag_name))]
pub async fn publish<R: Runtime>(
    runtime: &R,
    repo: Option<&str>,
    api_url: Option<String>,
    input: &ReleaseInput,
) -> Result<()> {
    let (_config, github) = connect(runtime, repo, api_url).await?;

    // Without the complete listing we cannot tell update from create.
    let releases = github
        .list_releases()
        .await
        .context("Failed to list GitHub releases")?;

    report(reconcile(&github, &releases, &input.tag_name, input.name(), &input.message).await);
    Ok(())
}
