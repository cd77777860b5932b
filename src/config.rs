//! Configuration resolved from the environment and command-line overrides.

use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};

use crate::{
    error::{Error, Result},
    http::ClientConfig,
    repo::RepoId,
    runtime::Runtime,
};

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_RELEASE_TOKEN";

/// Environment variable that may name the repository (`owner/repo`).
pub const REPO_ENV: &str = "GITHUB_RELEASE_REPO";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Version string sent in the User-Agent.
pub const VERSION: &str = env!("RELEASE_PARTY_VERSION");

/// Everything needed to talk to the releases API for one repository.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub repo: RepoId,
    pub api_url: String,
}

impl Config {
    /// Resolves token and repository. Fails before any network access.
    ///
    /// The repository comes from `repo` when given, otherwise from the `origin`
    /// remote of the current git checkout.
    pub fn load<R: Runtime>(runtime: &R, repo: Option<&str>, api_url: Option<String>) -> Result<Self> {
        let token = match runtime.env_var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => token.trim().to_string(),
            _ => {
                return Err(Error::Configuration(format!(
                    "Configure {} to create GitHub releases.",
                    TOKEN_ENV
                )));
            }
        };

        let repo = match repo {
            Some(repo) => repo.parse::<RepoId>()?,
            None => runtime
                .git_remotes()
                .ok()
                .and_then(|output| RepoId::from_git_remotes(&output))
                .ok_or_else(|| {
                    Error::Configuration(format!(
                        "Can't find the GitHub repo. Please use the remote 'origin' or set {}.",
                        REPO_ENV
                    ))
                })?,
        };

        debug!("Using {} for authentication: {}", TOKEN_ENV, mask(&token));
        debug!("Using repository {}", repo);

        Ok(Self {
            token,
            repo,
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }

    /// Client defaults for requests against the API base URL.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut headers = HeaderMap::new();

        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| Error::Configuration(format!("Invalid {}: {}", TOKEN_ENV, e)))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let user_agent = HeaderValue::from_str(&format!("release-party/{}", VERSION))
            .map_err(|e| Error::Configuration(format!("Invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, user_agent);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        Ok(ClientConfig {
            base_url: Some(self.api_url.clone()),
            default_headers: headers,
            ..ClientConfig::default()
        })
    }
}

/// Keeps a short prefix and suffix of a secret for log output.
fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
