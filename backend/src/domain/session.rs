//! Provider-issued session model.
//!
//! The identity provider owns every value here. The service only checks that
//! a session exists, forwards its tokens back to the provider, and exposes a
//! read-only [`SessionSnapshot`] to pages.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

/// Validation errors for session values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionValidationError {
    /// The user identifier was blank.
    #[error("user id must not be empty")]
    EmptyUserId,
    /// A token was blank.
    #[error("session token must not be empty")]
    EmptyToken,
}

/// Opaque user identifier assigned by the provider.
///
/// # Examples
/// ```
/// use tutor_portal::domain::UserId;
///
/// let id = UserId::new("7d0c5b5e-8f0a-4bde-9c55-4b5ac3b1e1f2").unwrap();
/// assert_eq!(id.as_ref(), "7d0c5b5e-8f0a-4bde-9c55-4b5ac3b1e1f2");
/// assert!(UserId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a provider identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SessionValidationError::EmptyUserId);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = SessionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

macro_rules! secret_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(Zeroizing<String>);

        impl $name {
            /// Validate and wrap a raw token.
            pub fn new(raw: impl Into<String>) -> Result<Self, SessionValidationError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(SessionValidationError::EmptyToken);
                }
                Ok(Self(Zeroizing::new(raw)))
            }

            /// Raw token value for forwarding to the provider.
            pub fn expose(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(<redacted>)"))
            }
        }
    };
}

secret_token! {
    /// Bearer token authorising calls on behalf of the user.
    AccessToken
}

secret_token! {
    /// Long-lived token used by the provider to mint new access tokens.
    RefreshToken
}

/// The signed-in user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    /// Provider identifier.
    pub id: UserId,
    /// Email on file, when the provider returns one.
    pub email: Option<String>,
}

/// Session established with the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Access token.
    pub access_token: AccessToken,
    /// Refresh token, when issued.
    pub refresh_token: Option<RefreshToken>,
    /// Expiry instant derived from the provider response.
    pub expires_at: Option<DateTime<Utc>>,
    /// Owner of the session.
    pub user: SessionUser,
}

impl Session {
    /// Read-only view safe to hand to pages.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user_id: self.user.id.clone(),
            email: self.user.email.clone(),
            expires_at: self.expires_at,
        }
    }

    /// Whether the access token has passed its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Typed read-only session state served to pages.
///
/// Example JSON:
/// `{"userId":"7d0c5b5e-8f0a-4bde-9c55-4b5ac3b1e1f2","email":"tutor@example.com","expiresAt":"2026-10-17T12:00:00Z"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Provider user identifier.
    pub user_id: UserId,
    /// Email, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Access token expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}
