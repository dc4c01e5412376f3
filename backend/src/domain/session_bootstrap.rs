//! Session bootstrap and redirect flow.
//!
//! Turns an inbound authentication signal (callback code or submitted
//! credentials) into a provider session and decides where the browser goes
//! next. Every failure is terminal for the request: no retries, no backoff.

use std::sync::Arc;

use tracing::{info, warn};

use super::ports::{ClientStorage, IdentityProvider, IdentityProviderError, StorageScope};
use super::{
    AccessToken, AuthCode, AuthorizeRequest, CodeExchange, CodeVerifier, Error, OAuthProvider,
    PasswordCredentials, RedirectTarget, Session,
};

/// Start of an OAuth sign-in: where to send the browser and what to remember.
#[derive(Debug)]
pub struct OAuthStart {
    /// Provider authorise page.
    pub authorize_url: String,
    /// Verifier to keep in the session until the callback arrives.
    pub verifier: CodeVerifier,
}

/// Result of handling the OAuth callback.
///
/// Both variants are redirects; only `Established` carries a session for
/// the adapter to persist.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// The code was exchanged; persist the session and go to `redirect`.
    Established {
        /// Newly issued session.
        session: Box<Session>,
        /// Validated `next` target.
        redirect: RedirectTarget,
    },
    /// The exchange failed; go to the login page with the error flag.
    Failed {
        /// Always [`RedirectTarget::login_with_callback_error`].
        redirect: RedirectTarget,
    },
}

impl CallbackOutcome {
    /// Where the browser is sent.
    pub fn redirect(&self) -> &RedirectTarget {
        match self {
            Self::Established { redirect, .. } | Self::Failed { redirect } => redirect,
        }
    }
}

/// Result of a successful password sign-in.
#[derive(Debug)]
pub struct SignInOutcome {
    /// Session to persist.
    pub session: Session,
    /// Always the dashboard.
    pub redirect: RedirectTarget,
}

/// Result of signing out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutOutcome {
    /// Always the login page.
    pub redirect: RedirectTarget,
    /// Whether the provider confirmed the revocation.
    pub provider_revoked: bool,
}

/// Orchestrates the three session operations against an identity provider.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use tutor_portal::domain::SessionBootstrapService;
/// use tutor_portal::domain::ports::FixtureIdentityProvider;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let service = SessionBootstrapService::new(Arc::new(FixtureIdentityProvider));
/// let outcome = service.exchange_code_for_session(Some("expired"), None, None).await;
/// assert_eq!(outcome.redirect().as_str(), "/login?error=auth_callback_error");
/// # });
/// ```
#[derive(Clone)]
pub struct SessionBootstrapService {
    provider: Arc<dyn IdentityProvider>,
}

impl SessionBootstrapService {
    /// Build the service around a provider adapter.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Begin an OAuth sign-in against `provider`.
    ///
    /// A fresh PKCE verifier is generated and only its challenge leaves the
    /// process. `next` is validated now and carried on `callback_url` so the
    /// callback lands where the tutor was heading.
    pub fn begin_oauth(
        &self,
        provider: &str,
        next: Option<&str>,
        callback_url: &str,
    ) -> Result<OAuthStart, Error> {
        let provider =
            OAuthProvider::new(provider).map_err(|error| Error::invalid_request(error.to_string()))?;
        let next = RedirectTarget::from_next(next);
        let encoded_next: String =
            url::form_urlencoded::byte_serialize(next.as_str().as_bytes()).collect();
        let verifier = CodeVerifier::generate();
        let request = AuthorizeRequest {
            provider,
            code_challenge: verifier.challenge(),
            redirect_to: format!("{callback_url}?next={encoded_next}"),
        };

        let authorize_url = self.provider.authorize_url(&request).map_err(|error| {
            warn!(error = %error, "could not build provider authorise URL");
            map_provider_error(error)
        })?;
        info!(provider = request.provider.as_str(), "oauth sign-in started");
        Ok(OAuthStart {
            authorize_url,
            verifier,
        })
    }

    /// Exchange a callback code and pick the redirect target.
    ///
    /// A missing or blank code counts as a failed exchange. `next` is
    /// resolved through [`RedirectTarget::from_next`].
    pub async fn exchange_code_for_session(
        &self,
        code: Option<&str>,
        next: Option<&str>,
        verifier: Option<CodeVerifier>,
    ) -> CallbackOutcome {
        let failed = || CallbackOutcome::Failed {
            redirect: RedirectTarget::login_with_callback_error(),
        };

        let Some(code) = code.and_then(|raw| AuthCode::new(raw).ok()) else {
            warn!("auth callback without a usable code");
            return failed();
        };

        let exchange = CodeExchange { code, verifier };
        match self.provider.exchange_code(&exchange).await {
            Ok(session) => {
                let redirect = RedirectTarget::from_next(next);
                info!(user_id = %session.user.id, redirect = %redirect, "auth callback established session");
                CallbackOutcome::Established {
                    session: Box::new(session),
                    redirect,
                }
            }
            Err(error) => {
                warn!(error = %error, "auth callback code exchange failed");
                failed()
            }
        }
    }

    /// Forward credentials to the provider.
    ///
    /// On rejection the provider's message is returned unchanged as an
    /// unauthorised error.
    pub async fn sign_in_with_password(
        &self,
        credentials: &PasswordCredentials,
    ) -> Result<SignInOutcome, Error> {
        match self.provider.sign_in_with_password(credentials).await {
            Ok(session) => {
                info!(user_id = %session.user.id, "password sign-in succeeded");
                Ok(SignInOutcome {
                    session,
                    redirect: RedirectTarget::dashboard(),
                })
            }
            Err(error) => {
                warn!(error = %error, "password sign-in failed");
                Err(map_provider_error(error))
            }
        }
    }

    /// Revoke the session and clear every storage scope.
    ///
    /// Storage is cleared after the provider call returns, whatever its
    /// outcome, so the redirect never leaves stale state behind. A storage
    /// failure is the only error surfaced.
    pub async fn sign_out(
        &self,
        access_token: Option<&AccessToken>,
        storage: &dyn ClientStorage,
    ) -> Result<SignOutOutcome, Error> {
        let provider_revoked = match access_token {
            Some(token) => match self.provider.sign_out(token).await {
                Ok(()) => true,
                Err(error) => {
                    warn!(error = %error, "provider sign-out failed; clearing local state anyway");
                    false
                }
            },
            None => false,
        };

        for scope in StorageScope::ALL {
            storage.clear(scope)?;
        }

        info!(provider_revoked, "signed out");
        Ok(SignOutOutcome {
            redirect: RedirectTarget::login(),
            provider_revoked,
        })
    }
}

/// Map provider failures onto domain errors, keeping rejection text verbatim.
pub fn map_provider_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::Rejected { message } => Error::unauthorized(message),
        IdentityProviderError::Unavailable { .. } => Error::service_unavailable(error.to_string()),
        IdentityProviderError::Decode { .. } => Error::internal(error.to_string()),
    }
}

#[cfg(test)]
#[path = "session_bootstrap_tests.rs"]
mod tests;
