//! HTTP client issuing GET/POST/PATCH requests against an optional base URL.

use std::fmt;
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};

use super::response::HttpResponse;
use crate::error::{Error, Result};

/// Default connect timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read timeout.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Defaults applied to requests whose target is relative to `base_url`.
///
/// Absolute URLs never receive `default_headers` or `default_query`, so
/// credentials configured here stay on the configured host. The default
/// query is also kept out of logs, errors and [`HttpResponse::url`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub default_headers: HeaderMap,
    pub default_query: Vec<(String, String)>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            default_query: Vec::new(),
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }
}

/// The request methods this client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    fn sends_body(self) -> bool {
        matches!(self, Method::Post | Method::Patch)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        };
        f.write_str(name)
    }
}

/// Per-call options. Nothing here is retained by the client.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub body: Option<String>,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// HTTP client without retries, redirect following or connection reuse.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient {
    /// Creates a client with the given defaults.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(Error::Build)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the final URL string for `url` plus the extra `query` pairs.
    pub fn resolve_url(&self, url: &str, query: &[(String, String)]) -> String {
        self.build_url(url, query, true)
    }

    fn build_url(&self, url: &str, query: &[(String, String)], with_defaults: bool) -> String {
        let mut target = url.to_string();

        if is_relative(url) {
            if let Some(base) = &self.config.base_url {
                target = format!("{}{}", base.trim_end_matches('/'), url);
            }
            if with_defaults {
                target = append_query(target, &self.config.default_query);
            }
        }

        append_query(target, query)
    }

    /// Sends a single request and wraps the answer, whatever its status.
    #[tracing::instrument(skip(self, options))]
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse> {
        // `shown` omits the default query, which may carry credentials.
        let shown = self.build_url(url, &options.query, false);
        let parsed = Url::parse(&self.resolve_url(url, &options.query))
            .map_err(|e| Error::Validation(format!("invalid URL {}: {}", shown, e)))?;
        let shown = Url::parse(&shown)
            .map_err(|e| Error::Validation(format!("invalid URL {}: {}", shown, e)))?;

        let mut headers = HeaderMap::new();
        if is_relative(url) {
            headers.extend(self.config.default_headers.clone());
        }
        headers.extend(options.headers);

        debug!("{} {}", method, shown);

        let mut builder = self
            .client
            .request(method.into(), parsed)
            .headers(headers);

        if method.sends_body() {
            if let Some(body) = options.body {
                builder = builder.body(body);
            }
        }

        let response = builder.send().await.map_err(|source| Error::Transport {
            url: shown.to_string(),
            source: source.without_url(),
        })?;

        HttpResponse::from_reqwest(response, shown).await
    }

    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::Get, url, options).await
    }

    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::Post, url, options).await
    }

    pub async fn patch(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::Patch, url, options).await
    }
}

fn is_relative(url: &str) -> bool {
    url.starts_with('/')
}

/// Appends `key=value` pairs, picking `?` or `&` depending on the existing query.
fn append_query(url: String, pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return url;
    }

    let params = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, params)
}
