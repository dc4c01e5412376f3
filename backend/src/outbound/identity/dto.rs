//! Wire types for the identity provider's auth endpoints.
//!
//! Responses decode into these DTOs first and are then mapped into domain
//! sessions in one pass.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AccessToken, RefreshToken, Session, SessionUser, UserId};

#[derive(Serialize)]
pub(super) struct PkceGrantDto<'a> {
    pub(super) auth_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) code_verifier: Option<&'a str>,
}

#[derive(Serialize)]
pub(super) struct PasswordGrantDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) access_token: String,
    #[serde(default)]
    pub(super) refresh_token: Option<String>,
    #[serde(default)]
    pub(super) expires_in: Option<i64>,
    #[serde(default)]
    pub(super) expires_at: Option<i64>,
    pub(super) user: UserDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    pub(super) id: String,
    #[serde(default)]
    pub(super) email: Option<String>,
}

/// Error envelope; the provider uses several field names across versions.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBodyDto {
    /// Most specific non-blank message present, exactly as sent.
    pub(super) fn into_message(self) -> Option<String> {
        [self.error_description, self.msg, self.message, self.error]
            .into_iter()
            .flatten()
            .find(|message| !message.trim().is_empty())
    }
}

impl TokenResponseDto {
    /// Map into a domain session.
    ///
    /// An absolute `expires_at` wins over the relative `expires_in`, which is
    /// resolved against `now`.
    pub(super) fn into_session(self, now: DateTime<Utc>) -> Result<Session, String> {
        let expires_at = match (self.expires_at, self.expires_in) {
            (Some(seconds), _) => Some(
                DateTime::<Utc>::from_timestamp(seconds, 0)
                    .ok_or_else(|| format!("expires_at {seconds} out of range"))?,
            ),
            (None, Some(seconds)) => Some(
                TimeDelta::try_seconds(seconds)
                    .and_then(|delta| now.checked_add_signed(delta))
                    .ok_or_else(|| format!("expires_in {seconds} out of range"))?,
            ),
            (None, None) => None,
        };
        let invalid = |error: crate::domain::SessionValidationError| error.to_string();
        Ok(Session {
            access_token: AccessToken::new(self.access_token).map_err(invalid)?,
            refresh_token: self
                .refresh_token
                .filter(|token| !token.is_empty())
                .map(RefreshToken::new)
                .transpose()
                .map_err(invalid)?,
            expires_at,
            user: SessionUser {
                id: UserId::new(self.user.id).map_err(invalid)?,
                email: self.user.email.filter(|email| !email.is_empty()),
            },
        })
    }
}
