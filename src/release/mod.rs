//! Release reconciliation: list, find, update or create releases by tag.
//!
//! [`ReleaseApi`] is the seam between reconciliation logic and the remote
//! API. [`GitHubReleases`] implements it over HTTP; [`BatchSession`] shares
//! one fetched listing across many reconciliations.

mod github;
mod session;

use std::fmt;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

pub use github::{GITHUB_WEB_URL, GitHubReleases, Identity};
pub use session::BatchSession;

/// A release as returned by the API.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Instructions for creating a release by hand after the API refused it.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualFallback {
    /// Prefilled "new release" page.
    pub url: String,
    pub tag_name: String,
    pub title: String,
    pub message: String,
}

impl fmt::Display for ManualFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Failed to create GitHub release!")?;
        writeln!(f, "Create it manually here: {}", self.url)?;
        writeln!(f, "Tag version: {}", self.tag_name)?;
        writeln!(f, "Release title: {}", self.title)?;
        writeln!(f, "Message:")?;
        write!(f, "{}", self.message)
    }
}

/// Result of an update or create call that reached the API.
///
/// Failures are values, not errors: a refused create or update must not stop
/// a deployment.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created {
        tag_name: String,
        /// The new release, when the response carried it.
        release: Option<Release>,
    },
    Updated {
        name: String,
    },
    CreateFailed {
        error: ApiError,
        /// The exact JSON body that was sent.
        payload: String,
        fallback: ManualFallback,
    },
    UpdateFailed {
        id: u64,
        name: String,
        error: ApiError,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Created { .. } | Outcome::Updated { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created { tag_name, .. } => write!(f, "GitHub release {} created!", tag_name),
            Outcome::Updated { name } => write!(f, "GitHub release {} updated!", name),
            Outcome::CreateFailed {
                error,
                payload,
                fallback,
            } => {
                writeln!(f, "{}", error)?;
                writeln!(f)?;
                writeln!(f, "Body sent: {}", payload)?;
                writeln!(f)?;
                write!(f, "{}", fallback)
            }
            Outcome::UpdateFailed { id, name, error } => {
                writeln!(f, "Failed to update GitHub release {} (id {})!", name, id)?;
                write!(f, "{}", error)
            }
        }
    }
}

/// Operations against a repository's releases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    /// Every release of the repository, in API order.
    async fn list_releases(&self) -> Result<Vec<Release>>;

    async fn update_release(&self, id: u64, name: &str, message: &str) -> Result<Outcome>;

    async fn create_release(&self, tag_name: &str, name: &str, message: &str) -> Result<Outcome>;

    /// Updates the release tagged `tag_name`, or creates it, using a fresh listing.
    async fn update_or_create(&self, tag_name: &str, name: &str, message: &str) -> Result<Outcome> {
        let releases = self.list_releases().await?;
        reconcile(self, &releases, tag_name, name, message).await
    }
}

/// First release in `releases` whose tag is `tag_name`.
pub fn find_release<'a>(releases: &'a [Release], tag_name: &str) -> Option<&'a Release> {
    releases.iter().find(|release| release.tag_name == tag_name)
}

/// Updates or creates `tag_name` based on an already fetched listing.
pub async fn reconcile<A: ReleaseApi + ?Sized>(
    api: &A,
    releases: &[Release],
    tag_name: &str,
    name: &str,
    message: &str,
) -> Result<Outcome> {
    match find_release(releases, tag_name) {
        Some(release) => {
            debug!("Release {} exists (id {}), updating", tag_name, release.id);
            api.update_release(release.id, name, message).await
        }
        None => {
            debug!("No release for {}, creating", tag_name);
            api.create_release(tag_name, name, message).await
        }
    }
}
