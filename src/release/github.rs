//! GitHub implementation of [`ReleaseApi`].

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{ManualFallback, Outcome, Release, ReleaseApi};
use crate::{
    config::Config,
    error::{ApiError, Error, Result},
    http::{HttpClient, HttpResponse, RequestOptions},
    repo::RepoId,
};

/// Base of the web UI used for manual fallback links.
pub const GITHUB_WEB_URL: &str = "https://github.com";

/// The authenticated account, as reported by the identity check.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Identity {
    pub login: String,
}

#[derive(Serialize)]
struct CreateRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct UpdateRelease<'a> {
    name: &'a str,
    body: &'a str,
}

/// Releases of one GitHub repository.
pub struct GitHubReleases {
    http: HttpClient,
    repo: RepoId,
    web_url: String,
}

impl GitHubReleases {
    /// Create from an existing HttpClient whose base URL is the API root.
    pub fn new(http: HttpClient, repo: RepoId) -> Self {
        Self {
            http,
            repo,
            web_url: GITHUB_WEB_URL.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let http = HttpClient::new(config.client_config()?)?;
        Ok(Self::new(http, config.repo.clone()))
    }

    /// Overrides the web UI base used in fallback links (GitHub Enterprise).
    pub fn with_web_url(mut self, web_url: &str) -> Self {
        self.web_url = web_url.trim_end_matches('/').to_string();
        self
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Checks that the configured token is accepted by the API.
    ///
    /// Any failure here should stop the workflow.
    #[tracing::instrument(skip(self), fields(repo = %self.repo))]
    pub async fn verify_access(&self) -> Result<Identity> {
        let response = self.http.get("/user", RequestOptions::new()).await?;
        if !response.is_success() {
            return Err(Error::Auth(api_error(&response)));
        }

        let identity: Identity = response.json_as()?;
        debug!("Authenticated as {}", identity.login);
        Ok(identity)
    }

    fn releases_path(&self) -> String {
        format!("/repos/{}/releases", self.repo)
    }

    /// Prefilled "new release" page for manual creation.
    fn new_release_url(&self, tag_name: &str, title: &str) -> String {
        let base = format!("{}/{}/releases/new", self.web_url, self.repo);
        Url::parse_with_params(&base, &[("tag", tag_name), ("title", title)])
            .map(|url| url.to_string())
            .unwrap_or(base)
    }
}

#[async_trait]
impl ReleaseApi for GitHubReleases {
    #[tracing::instrument(skip(self), fields(repo = %self.repo))]
    async fn list_releases(&self) -> Result<Vec<Release>> {
        let path = self.releases_path();
        let mut releases = Vec::new();
        let mut page: u32 = 1;

        // No page cap: the API ends the listing with an empty page.
        loop {
            debug!("Fetching releases page {} from {}...", page, path);

            let options = RequestOptions::new().query("page", page.to_string());
            let response = self.http.get(&path, options).await?;
            if !response.is_success() {
                return Err(Error::Api(api_error(&response)));
            }

            let parsed: Vec<Release> = response.json_as()?;
            if parsed.is_empty() {
                break;
            }

            releases.extend(parsed);
            page += 1;
        }

        debug!("Fetched {} releases of {}", releases.len(), self.repo);
        Ok(releases)
    }

    #[tracing::instrument(skip(self, message), fields(repo = %self.repo))]
    async fn update_release(&self, id: u64, name: &str, message: &str) -> Result<Outcome> {
        let payload = to_json(&UpdateRelease { name, body: message })?;
        let path = format!("{}/{}", self.releases_path(), id);

        let response = self.http.patch(&path, json_body(payload)).await?;
        if response.is_success() {
            info!("GitHub release {} updated", name);
            return Ok(Outcome::Updated {
                name: name.to_string(),
            });
        }

        let error = api_error(&response);
        warn!("Failed to update GitHub release {}: {}", name, error);
        Ok(Outcome::UpdateFailed {
            id,
            name: name.to_string(),
            error,
        })
    }

    #[tracing::instrument(skip(self, message), fields(repo = %self.repo))]
    async fn create_release(&self, tag_name: &str, name: &str, message: &str) -> Result<Outcome> {
        let payload = to_json(&CreateRelease {
            tag_name,
            name,
            body: message,
        })?;

        let response = self
            .http
            .post(&self.releases_path(), json_body(payload.clone()))
            .await?;
        if response.is_success() {
            info!("GitHub release {} created", tag_name);
            return Ok(Outcome::Created {
                tag_name: tag_name.to_string(),
                release: response.json_as().ok(),
            });
        }

        let error = api_error(&response);
        warn!("Failed to create GitHub release {}: {}", tag_name, error);
        Ok(Outcome::CreateFailed {
            error,
            payload,
            fallback: ManualFallback {
                url: self.new_release_url(tag_name, name),
                tag_name: tag_name.to_string(),
                title: name.to_string(),
                message: message.to_string(),
            },
        })
    }
}

fn api_error(response: &HttpResponse) -> ApiError {
    ApiError::new(
        &response.request_path(),
        response.code(),
        response.body(),
        response.headers(),
    )
}

fn json_body(payload: String) -> RequestOptions {
    RequestOptions::new()
        .body(payload)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Validation(format!("cannot serialize release payload: {}", e)))
}
