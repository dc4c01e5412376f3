//! Environment parsing helpers for session configuration.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SESSION_SAMESITE_ENV, SessionConfigError};

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Release builds surface `error`; debug builds log `note` and use `fallback`.
fn lenient<T>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
    note: &str,
) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn!(%error, "{note}");
        Ok(fallback)
    } else {
        Err(error)
    }
}

/// Read a boolean toggle; `fallback` applies only in debug builds.
pub(super) fn flag_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    fallback: bool,
) -> Result<bool, SessionConfigError> {
    let note = if fallback {
        "session toggle defaulted to enabled"
    } else {
        "session toggle defaulted to disabled"
    };
    match env.string(name) {
        Some(value) => match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => lenient(
                mode,
                fallback,
                SessionConfigError::Invalid {
                    name,
                    value,
                    expected: BOOL_EXPECTED,
                },
                note,
            ),
        },
        None => lenient(mode, fallback, SessionConfigError::Missing { name }, note),
    }
}

/// Read the `SameSite` policy, refusing `None` without `Secure` in release.
pub(super) fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    const NOTE: &str = "session SameSite defaulted to Lax";

    let Some(value) = env.string(SESSION_SAMESITE_ENV) else {
        return lenient(
            mode,
            SameSite::Lax,
            SessionConfigError::Missing {
                name: SESSION_SAMESITE_ENV,
            },
            NOTE,
        );
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => lenient(
            mode,
            SameSite::None,
            SessionConfigError::SameSiteNoneNeedsSecure,
            "browsers may reject SameSite=None cookies without Secure",
        ),
        _ => lenient(
            mode,
            SameSite::Lax,
            SessionConfigError::Invalid {
                name: SESSION_SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
            NOTE,
        ),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
