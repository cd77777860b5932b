//! Response wrapper with lazily parsed JSON and redirect helpers.

use std::borrow::Cow;
use std::sync::OnceLock;

use reqwest::Url;
use reqwest::header::{HeaderMap, LOCATION};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// A fully read HTTP response. Immutable once constructed.
#[derive(Debug)]
pub struct HttpResponse {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
    url: Url,
    // Parse outcome is cached; serde_json::Error is not Clone, so keep its message.
    json: OnceLock<std::result::Result<Value, String>>,
}

impl HttpResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>, url: Url) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            url,
            json: OnceLock::new(),
        }
    }

    /// Reads the whole body of a reqwest response.
    pub(crate) async fn from_reqwest(response: reqwest::Response, url: Url) -> Result<Self> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source: source.without_url(),
        })?;

        Ok(Self::new(status, headers, body.to_vec(), url))
    }

    pub fn code(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The URL the request was sent to, without the client's default query.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path and query of the request URL, as used in diagnostics.
    pub fn request_path(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }

    /// Parses the body on first call; later calls return the cached result.
    pub fn json(&self) -> Result<&Value> {
        let parsed = self
            .json
            .get_or_init(|| serde_json::from_slice(&self.body).map_err(|e| e.to_string()));

        match parsed {
            Ok(value) => Ok(value),
            Err(msg) => Err(Error::Parse(msg.clone())),
        }
    }

    /// Deserializes the cached JSON value into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(self.json()?).map_err(|e| Error::Parse(e.to_string()))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Absolute target of a redirect.
    ///
    /// A relative `Location` is resolved against the request's origin. Anything
    /// else must be an absolute http(s) URL.
    pub fn redirect_url(&self) -> Result<Url> {
        if !self.is_redirect() {
            return Err(Error::Validation(format!(
                "not a redirect: {} {}",
                self.status, self.url
            )));
        }

        let location = self
            .headers
            .get(LOCATION)
            .ok_or_else(|| Error::Validation(format!("redirect from {} has no Location", self.url)))?
            .to_str()
            .map_err(|_| Error::Validation(format!("bad redirect: non-ASCII Location from {}", self.url)))?;

        resolve_redirect(&self.url, location)
    }

    /// Whether this is a redirect that stays on the request's scheme, host and port.
    pub fn is_same_origin_redirect(&self) -> Result<bool> {
        if !self.is_redirect() {
            return Ok(false);
        }
        let target = self.redirect_url()?;
        Ok(target.origin() == self.url.origin())
    }
}

fn resolve_redirect(origin: &Url, location: &str) -> Result<Url> {
    let bad_redirect = || Error::Validation(format!("bad redirect: {}", location));

    let absolute = if location.starts_with('/') {
        format!("{}{}", origin.origin().ascii_serialization(), location)
    } else if is_absolute_http(location) {
        location.to_string()
    } else {
        return Err(bad_redirect());
    };

    Url::parse(&absolute).map_err(|_| bad_redirect())
}

fn is_absolute_http(location: &str) -> bool {
    location
        .strip_prefix("https://")
        .or_else(|| location.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty())
}
