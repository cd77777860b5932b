//! One fetched release listing shared across a batch of reconciliations.

use log::debug;

use super::{Outcome, Release, ReleaseApi, find_release, reconcile};
use crate::error::Result;

/// Release listing held for the lifetime of one batch run.
///
/// Releases the session creates are recorded when the API returns them, so a
/// repeated tag within the batch is updated instead of created twice.
pub struct BatchSession<'a, A: ReleaseApi + ?Sized> {
    api: &'a A,
    releases: Vec<Release>,
}

impl<'a, A: ReleaseApi + ?Sized> BatchSession<'a, A> {
    /// Fetches the full listing once.
    pub async fn start(api: &'a A) -> Result<Self> {
        let releases = api.list_releases().await?;
        debug!("Batch session started with {} releases", releases.len());
        Ok(Self { api, releases })
    }

    /// Uses a listing the caller already holds.
    pub fn with_releases(api: &'a A, releases: Vec<Release>) -> Self {
        Self { api, releases }
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    pub fn find(&self, tag_name: &str) -> Option<&Release> {
        find_release(&self.releases, tag_name)
    }

    /// Replaces the cached listing with a fresh one.
    pub async fn refresh(&mut self) -> Result<()> {
        self.releases = self.api.list_releases().await?;
        Ok(())
    }

    pub async fn update_or_create(
        &mut self,
        tag_name: &str,
        name: &str,
        message: &str,
    ) -> Result<Outcome> {
        let outcome = reconcile(self.api, &self.releases, tag_name, name, message).await?;

        if let Outcome::Created {
            release: Some(release),
            ..
        } = &outcome
        {
            self.releases.push(release.clone());
        }

        Ok(outcome)
    }
}
