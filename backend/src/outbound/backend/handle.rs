//! Authenticated handle to the external backend.
//!
//! One reqwest client carries the API key headers on every request. It is
//! built once at startup from a validated [`BackendConfig`] and shared by
//! every adapter that talks to the backend.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use url::Url;

use super::config::BackendConfig;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("apikey");

/// Errors raised while building the handle or a request.
#[derive(Debug, thiserror::Error)]
pub enum BackendHandleError {
    /// The API key contains bytes that cannot appear in a header.
    #[error("backend API key is not a valid header value")]
    InvalidApiKey,
    /// The bearer token contains bytes that cannot appear in a header.
    #[error("bearer token is not a valid header value")]
    InvalidBearer,
    /// The endpoint path could not be joined onto the base URL.
    #[error("invalid backend path {path}: {source}")]
    InvalidPath {
        /// Path as supplied.
        path: String,
        /// Join failure.
        #[source]
        source: url::ParseError,
    },
    /// The endpoint path resolved outside the base URL.
    #[error("backend path {path} escapes the base URL")]
    OutsideBase {
        /// Path as supplied.
        path: String,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build backend client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Handle providing authenticated fetches against the backend.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use tutor_portal::outbound::backend::{BackendConfig, BackendHandle};
///
/// let config = BackendConfig::new("https://project.example.co", "anon-key").unwrap();
/// let handle = BackendHandle::new(&config, Duration::from_secs(5)).unwrap();
/// assert_eq!(handle.endpoint("auth/v1/logout").unwrap().as_str(),
///            "https://project.example.co/auth/v1/logout");
/// ```
#[derive(Clone, Debug)]
pub struct BackendHandle {
    client: Client,
    base_url: Url,
}

impl BackendHandle {
    /// Build the client with default API key headers and a request timeout.
    pub fn new(config: &BackendConfig, timeout: Duration) -> Result<Self, BackendHandleError> {
        let key = config.api_key().expose();
        let mut api_key =
            HeaderValue::from_str(key).map_err(|_| BackendHandleError::InvalidApiKey)?;
        api_key.set_sensitive(true);
        let bearer = bearer_value(key).map_err(|_| BackendHandleError::InvalidApiKey)?;

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: config.url().clone(),
        })
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a relative endpoint path beneath the base URL.
    ///
    /// Absolute URLs and `..` segments that would leave the base are
    /// refused, so the API key headers only ever reach the backend.
    pub fn endpoint(&self, path: &str) -> Result<Url, BackendHandleError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| BackendHandleError::InvalidPath {
                path: path.to_owned(),
                source,
            })?;
        if url.origin() != self.base_url.origin() || !url.path().starts_with(self.base_url.path())
        {
            return Err(BackendHandleError::OutsideBase {
                path: path.to_owned(),
            });
        }
        Ok(url)
    }

    /// Start a request carrying the API key headers.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendHandleError> {
        Ok(self.client.request(method, self.endpoint(path)?))
    }

    /// Start a request authorised as the user owning `token`.
    pub fn request_as_user(
        &self,
        method: Method,
        path: &str,
        token: &str,
    ) -> Result<RequestBuilder, BackendHandleError> {
        let bearer = bearer_value(token).map_err(|_| BackendHandleError::InvalidBearer)?;
        Ok(self.request(method, path)?.header(AUTHORIZATION, bearer))
    }
}

fn bearer_value(token: &str) -> Result<HeaderValue, reqwest::header::InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}
