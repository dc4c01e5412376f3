//! Session cookie configuration.
//!
//! The encrypted session cookie carries provider tokens, so its key and
//! attributes come from the environment and are validated up front. Release
//! builds insist on explicit values; debug builds fall back to development
//! defaults with a warning.

use std::path::PathBuf;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

pub mod fingerprint;
mod parsing;

use parsing::{flag_from_env, same_site_from_env};

/// Path to the key file.
pub const SESSION_KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
/// `Secure` attribute toggle.
pub const SESSION_COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
/// `SameSite` attribute.
pub const SESSION_SAMESITE_ENV: &str = "SESSION_SAMESITE";
/// Permit a generated key when the key file cannot be read.
pub const SESSION_ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

/// Cookie name used for the session.
pub const SESSION_COOKIE_NAME: &str = "session";

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
// Key derivation needs at least this much material.
const SESSION_KEY_DERIVE_MIN_LEN: usize = 32;
const SESSION_TTL_DAYS: i64 = 7;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or invalid toggles fall back to defaults with a warning.
    Debug,
    /// Every toggle must be present and valid.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub(crate) fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable: {name}")]
    Missing {
        /// Variable name.
        name: &'static str,
    },
    /// A variable holds a value outside its accepted set.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file path.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The key file holds too little material.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file path.
        path: PathBuf,
        /// Bytes read.
        length: usize,
        /// Bytes required.
        min_len: usize,
    },
    /// `SameSite=None` without `Secure`.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    SameSiteNoneNeedsSecure,
    /// Generated keys are refused in release builds.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralKeyInRelease,
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Key encrypting and signing the cookie.
    pub key: Key,
    /// Whether the cookie is marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Session middleware storing the whole session in a private cookie.
    ///
    /// The cookie is encrypted so page scripts cannot read provider tokens,
    /// and it is `HttpOnly` for the same reason.
    pub fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_owned())
            .cookie_path("/".to_owned())
            .cookie_http_only(true)
            .cookie_secure(self.cookie_secure)
            .cookie_same_site(self.same_site)
            .cookie_content_security(CookieContentSecurity::Private)
            .session_lifecycle(
                PersistentSession::default().session_ttl(CookieDuration::days(SESSION_TTL_DAYS)),
            )
            .build()
    }
}

/// Build session settings from the environment.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use tutor_portal::inbound::http::session_config::{
///     session_settings_from_env, BuildMode,
/// };
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// // Debug builds start without any session variables.
/// let settings = session_settings_from_env(&env, BuildMode::Debug).unwrap();
/// assert!(settings.cookie_secure);
///
/// // Release builds refuse to guess.
/// assert!(session_settings_from_env(&env, BuildMode::Release).is_err());
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = flag_from_env(env, mode, SESSION_COOKIE_SECURE_ENV, true)?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let allow_ephemeral = flag_from_env(env, mode, SESSION_ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralKeyInRelease);
    }
    let key = session_key(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn session_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(SESSION_KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            let min_len = if mode.is_debug() {
                SESSION_KEY_DERIVE_MIN_LEN
            } else {
                SESSION_KEY_MIN_LEN
            };
            if bytes.len() < min_len {
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length: bytes.len(),
                    min_len,
                });
            }
            Ok(Key::derive_from(&bytes))
        }
        Err(source) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %source,
                "using temporary session key; sessions will not survive a restart"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

#[cfg(test)]
mod tests;
