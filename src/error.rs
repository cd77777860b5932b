//! Error types for the HTTP layer and the release registry.
//!
//! Fatal and non-fatal failures share one enum; which ones stop a workflow is
//! decided by the caller (see [`Error::is_fatal_config`]).

use std::collections::BTreeMap;
use std::fmt;

use reqwest::header::HeaderMap;

/// Errors produced while talking to the releases API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting (token, repository) is missing or unusable.
    #[error("{0}")]
    Configuration(String),

    /// The identity check against the API was rejected.
    #[error("GitHub authentication failed: {0}")]
    Auth(ApiError),

    /// Connection, timeout or body-read failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status.
    #[error("{0}")]
    Api(ApiError),

    /// The response body was requested as JSON but is not valid JSON.
    #[error("invalid JSON in response body: {0}")]
    Parse(String),

    /// A value (URL, redirect target) failed validation.
    #[error("{0}")]
    Validation(String),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl Error {
    /// True for errors raised before any request could be made.
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Build(_))
    }
}

/// Diagnostic context of a non-2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Request path (and query) that failed.
    pub path: String,
    pub status: u16,
    /// Canonical reason phrase, e.g. "Unprocessable Entity".
    pub reason: String,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ApiError {
    pub(crate) fn new(path: &str, status: u16, body: &[u8], headers: &HeaderMap) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();

        let headers = headers
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();

        Self {
            path: path.to_string(),
            status,
            reason,
            body: String::from_utf8_lossy(body).into_owned(),
            headers,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers = serde_json::to_string(&self.headers).unwrap_or_default();
        write!(
            f,
            "{}: {} {}: {}. {}",
            self.path, self.status, self.reason, self.body, headers
        )
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
