//! Session cookie adapter.
//!
//! Wraps the Actix cookie session so handlers deal in domain sessions. The
//! cookie is private (encrypted), so provider tokens never reach page
//! scripts; pages read [`SessionSnapshot`] instead.

use std::cell::Cell;

use actix_session::Session as CookieSession;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::ports::{ClientStorage, StorageScope};
use crate::domain::{
    AccessToken, CodeVerifier, Error, RefreshToken, Session, SessionSnapshot, SessionUser, UserId,
};

pub(crate) const AUTH_SESSION_KEY: &str = "auth";
pub(crate) const CODE_VERIFIER_KEY: &str = "code_verifier";

/// Cookie representation of a provider session.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.expose().to_owned(),
            refresh_token: session
                .refresh_token
                .as_ref()
                .map(|token| token.expose().to_owned()),
            expires_at: session.expires_at,
            user_id: session.user.id.to_string(),
            email: session.user.email.clone(),
        }
    }
}

impl TryFrom<StoredSession> for Session {
    type Error = crate::domain::SessionValidationError;

    fn try_from(stored: StoredSession) -> Result<Self, Self::Error> {
        Ok(Self {
            access_token: AccessToken::new(stored.access_token)?,
            refresh_token: stored.refresh_token.map(RefreshToken::new).transpose()?,
            expires_at: stored.expires_at,
            user: SessionUser {
                id: UserId::new(stored.user_id)?,
                email: stored.email,
            },
        })
    }
}

/// Handler-facing view of the session cookie.
#[derive(Clone)]
pub struct SessionContext(CookieSession);

impl SessionContext {
    /// Wrap the underlying Actix session.
    pub fn new(session: CookieSession) -> Self {
        Self(session)
    }

    /// Store a freshly issued session, renewing the cookie identity.
    pub fn persist(&self, session: &Session) -> Result<(), Error> {
        self.0.renew();
        self.0.remove(CODE_VERIFIER_KEY);
        self.0
            .insert(AUTH_SESSION_KEY, StoredSession::from(session))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The stored session, if one is present and well formed.
    ///
    /// A cookie whose value no longer decodes, or decodes to an invalid
    /// session, is treated as signed out.
    pub fn session(&self) -> Result<Option<Session>, Error> {
        let stored = match self.0.get::<StoredSession>(AUTH_SESSION_KEY) {
            Ok(stored) => stored,
            Err(error) => {
                warn!(%error, "discarding unreadable session cookie");
                return Ok(None);
            }
        };
        Ok(stored.and_then(|stored| match Session::try_from(stored) {
            Ok(session) => Some(session),
            Err(error) => {
                warn!(%error, "discarding malformed session cookie");
                None
            }
        }))
    }

    /// Read-only snapshot of the current session, or `401 Unauthorized`.
    pub fn require_snapshot(&self, now: DateTime<Utc>) -> Result<SessionSnapshot, Error> {
        match self.session()? {
            Some(session) if !session.is_expired_at(now) => Ok(session.snapshot()),
            Some(_) => Err(Error::unauthorized("session expired")),
            None => Err(Error::unauthorized("login required")),
        }
    }

    /// Remember the PKCE verifier until the callback arrives.
    pub fn store_code_verifier(&self, verifier: &CodeVerifier) -> Result<(), Error> {
        self.0
            .insert(CODE_VERIFIER_KEY, verifier.as_str())
            .map_err(|error| Error::internal(format!("failed to store code verifier: {error}")))
    }

    /// PKCE verifier recorded when the OAuth flow began.
    pub fn code_verifier(&self) -> Option<CodeVerifier> {
        match self.0.get::<String>(CODE_VERIFIER_KEY) {
            Ok(value) => value.and_then(CodeVerifier::new),
            Err(error) => {
                warn!(%error, "ignoring unreadable code verifier");
                None
            }
        }
    }

    /// Drop every value and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = CookieSession::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// [`ClientStorage`] backed by the session cookie and `Clear-Site-Data`.
///
/// `Local` purges the cookie. `Session` is recorded and turned into a
/// `Clear-Site-Data` header on the redirect response, which makes the
/// browser drop `localStorage` and `sessionStorage` before following it.
pub struct BrowserStorage<'a> {
    session: &'a SessionContext,
    clear_site_data: Cell<bool>,
}

impl<'a> BrowserStorage<'a> {
    /// Wrap the request's session context.
    pub fn new(session: &'a SessionContext) -> Self {
        Self {
            session,
            clear_site_data: Cell::new(false),
        }
    }

    /// Whether the response must carry `Clear-Site-Data`.
    pub fn clear_site_data(&self) -> bool {
        self.clear_site_data.get()
    }
}

impl ClientStorage for BrowserStorage<'_> {
    fn clear(&self, scope: StorageScope) -> Result<(), Error> {
        match scope {
            StorageScope::Local => self.session.purge(),
            StorageScope::Session => self.clear_site_data.set(true),
        }
        Ok(())
    }
}
