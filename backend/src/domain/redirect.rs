//! Post-authentication redirect targets.
//!
//! The callback echoes a caller-supplied `next` parameter. Only same-origin
//! relative paths are honoured; everything else falls back to the dashboard
//! so the callback cannot be used as an open redirect.

use std::fmt;

/// Landing page after a successful sign-in or code exchange.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Login page used after sign-out and failed exchanges.
pub const LOGIN_PATH: &str = "/login";
/// Error flag appended to the login page when the callback fails.
pub const AUTH_CALLBACK_ERROR: &str = "auth_callback_error";

const MAX_TARGET_LEN: usize = 2048;

/// Validated same-origin redirect location.
///
/// ## Invariants
/// - Starts with a single `/` and is not protocol-relative (`//host`).
/// - Contains no backslashes, whitespace, or control characters.
///
/// # Examples
/// ```
/// use tutor_portal::domain::RedirectTarget;
///
/// assert_eq!(RedirectTarget::from_next(Some("/bonuses?tab=rates")).as_str(), "/bonuses?tab=rates");
/// assert_eq!(RedirectTarget::from_next(Some("https://evil.example")).as_str(), "/dashboard");
/// assert_eq!(RedirectTarget::from_next(None).as_str(), "/dashboard");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget(String);

impl RedirectTarget {
    /// The default landing page.
    pub fn dashboard() -> Self {
        Self(DASHBOARD_PATH.to_owned())
    }

    /// The login page without any flags.
    pub fn login() -> Self {
        Self(LOGIN_PATH.to_owned())
    }

    /// The login page flagged with [`AUTH_CALLBACK_ERROR`].
    pub fn login_with_callback_error() -> Self {
        Self(format!("{LOGIN_PATH}?error={AUTH_CALLBACK_ERROR}"))
    }

    /// Resolve the `next` query value, falling back to the dashboard.
    pub fn from_next(next: Option<&str>) -> Self {
        next.and_then(Self::parse_relative)
            .unwrap_or_else(Self::dashboard)
    }

    /// Accept `raw` only when it is a same-origin relative path.
    pub fn parse_relative(raw: &str) -> Option<Self> {
        if raw.len() > MAX_TARGET_LEN || !raw.starts_with('/') || raw.starts_with("//") {
            return None;
        }
        if raw
            .chars()
            .any(|c| c == '\\' || c.is_whitespace() || c.is_control())
        {
            return None;
        }
        Some(Self(raw.to_owned()))
    }

    /// Location header value.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
