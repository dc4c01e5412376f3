//! Backend connection settings.
//!
//! The base URL and API key come from the environment. Missing or blank
//! values are fatal: callers get an error at construction time and never a
//! half-configured value.

use std::fmt;

use mockable::Env;
use url::Url;
use zeroize::Zeroizing;

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";
/// Environment variable holding the backend API key.
pub const BACKEND_API_KEY_ENV: &str = "BACKEND_API_KEY";

/// Errors raised while reading backend settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable: {name}")]
    Missing {
        /// Variable name.
        name: &'static str,
    },
    /// A required value is present but blank.
    #[error("{name} must not be empty")]
    Empty {
        /// Variable name.
        name: &'static str,
    },
    /// The URL could not be parsed.
    #[error("invalid {name}: {reason}")]
    InvalidUrl {
        /// Variable name.
        name: &'static str,
        /// Parser message.
        reason: String,
    },
    /// The URL is not an `http` or `https` base URL.
    #[error("{name} must be an http(s) base URL")]
    UnsupportedUrl {
        /// Variable name.
        name: &'static str,
    },
}

/// Secret key sent with every backend request.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    /// Raw key for header construction.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Validated backend base URL plus API key.
///
/// ## Invariants
/// - `url` is an absolute `http`/`https` URL whose path ends with `/`, so
///   relative endpoint paths join beneath it.
/// - `api_key` is non-empty once trimmed.
///
/// # Examples
/// ```
/// use tutor_portal::outbound::backend::BackendConfig;
///
/// let config = BackendConfig::new("https://project.example.co", "anon-key").unwrap();
/// assert_eq!(config.url().as_str(), "https://project.example.co/");
/// assert!(BackendConfig::new("", "anon-key").is_err());
/// assert!(BackendConfig::new("https://project.example.co", " ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    url: Url,
    api_key: ApiKey,
}

impl BackendConfig {
    /// Validate raw values.
    pub fn new(url: &str, api_key: &str) -> Result<Self, BackendConfigError> {
        let url = parse_base_url(url)?;
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(BackendConfigError::Empty {
                name: BACKEND_API_KEY_ENV,
            });
        }
        Ok(Self {
            url,
            api_key: ApiKey(Zeroizing::new(api_key.to_owned())),
        })
    }

    /// Read [`BACKEND_URL_ENV`] and [`BACKEND_API_KEY_ENV`].
    pub fn from_env<E: Env>(env: &E) -> Result<Self, BackendConfigError> {
        let url = required(env, BACKEND_URL_ENV)?;
        let api_key = Zeroizing::new(required(env, BACKEND_API_KEY_ENV)?);
        Self::new(&url, &api_key)
    }

    /// Base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// API key.
    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }
}

fn required<E: Env>(env: &E, name: &'static str) -> Result<String, BackendConfigError> {
    env.string(name)
        .ok_or(BackendConfigError::Missing { name })
}

fn parse_base_url(raw: &str) -> Result<Url, BackendConfigError> {
    let name = BACKEND_URL_ENV;
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BackendConfigError::Empty { name });
    }
    let mut url = Url::parse(raw).map_err(|error| BackendConfigError::InvalidUrl {
        name,
        reason: error.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() || url.host().is_none()
    {
        return Err(BackendConfigError::UnsupportedUrl { name });
    }
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
