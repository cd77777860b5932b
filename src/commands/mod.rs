//! Command handlers behind the `release-party` binary.
//!
//! Configuration and access problems are fatal and returned as errors.
//! Failures to create or update a single release are printed and skipped.

use anyhow::{Context, Result};
use log::warn;

use crate::{
    config::Config,
    error,
    release::{GitHubReleases, Outcome},
    runtime::Runtime,
};

mod publish;
mod sync;
mod verify;

pub use publish::{ReleaseInput, create, publish};
pub use sync::{ManifestEntry, read_manifest, sync};
pub use verify::verify;

/// Loads configuration and checks the token before any release call.
async fn connect<R: Runtime>(
    runtime: &R,
    repo: Option<&str>,
    api_url: Option<String>,
) -> Result<(Config, GitHubReleases)> {
    let config = Config::load(runtime, repo, api_url)?;
    let github = GitHubReleases::from_config(&config)?;
    github
        .verify_access()
        .await
        .context("Cannot access the GitHub API")?;
    Ok((config, github))
}

/// Prints the outcome of a create/update call. Never fails.
fn report(result: error::Result<Outcome>) {
    match result {
        Ok(outcome) => println!("{}", outcome),
        Err(e) => {
            warn!("GitHub release call failed: {}", e);
            eprintln!("Failed to reach GitHub, continuing: {}", e);
        }
    }
}
