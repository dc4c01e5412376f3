//! Driven port for the external identity provider.
//!
//! The provider verifies credentials and issues sessions. Its internals are
//! opaque; adapters only translate requests and surface its messages.

use async_trait::async_trait;

use crate::domain::{
    AccessToken, AuthorizeRequest, CodeExchange, PasswordCredentials, Session, SessionUser, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Failures reported by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider refused the request; the message is its own.
        Rejected => "{message}",
        /// The provider could not be reached or answered with a server error.
        Unavailable => "identity provider unavailable: {message}",
        /// The provider answered with a payload the adapter could not read.
        Decode => "identity provider response invalid: {message}",
    }
}

/// Session operations delegated to the identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Absolute URL of the provider's authorise page for an OAuth sign-in.
    fn authorize_url(&self, request: &AuthorizeRequest) -> Result<String, IdentityProviderError>;

    /// Exchange a one-time callback code for a session.
    async fn exchange_code(&self, exchange: &CodeExchange)
    -> Result<Session, IdentityProviderError>;

    /// Verify an email/password pair and issue a session.
    async fn sign_in_with_password(
        &self,
        credentials: &PasswordCredentials,
    ) -> Result<Session, IdentityProviderError>;

    /// Revoke the session identified by `access_token`.
    async fn sign_out(&self, access_token: &AccessToken) -> Result<(), IdentityProviderError>;
}

/// Code accepted by [`FixtureIdentityProvider`].
pub const FIXTURE_AUTH_CODE: &str = "abc123";
/// Email accepted by [`FixtureIdentityProvider`].
pub const FIXTURE_EMAIL: &str = "tutor@example.com";
/// Password accepted by [`FixtureIdentityProvider`].
pub const FIXTURE_PASSWORD: &str = "password";
const FIXTURE_USER_ID: &str = "7d0c5b5e-8f0a-4bde-9c55-4b5ac3b1e1f2";

/// In-memory provider used in development builds without a backend and in tests.
///
/// Accepts [`FIXTURE_AUTH_CODE`] and the fixture email/password pair; every
/// other input is rejected with provider-style messages. Its authorise URL
/// skips the provider and points straight back at the callback with
/// [`FIXTURE_AUTH_CODE`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

impl FixtureIdentityProvider {
    fn session() -> Result<Session, IdentityProviderError> {
        let invalid = |err: crate::domain::SessionValidationError| {
            IdentityProviderError::decode(err.to_string())
        };
        Ok(Session {
            access_token: AccessToken::new("fixture-access-token").map_err(invalid)?,
            refresh_token: None,
            expires_at: None,
            user: SessionUser {
                id: UserId::new(FIXTURE_USER_ID).map_err(invalid)?,
                email: Some(FIXTURE_EMAIL.to_owned()),
            },
        })
    }
}

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    fn authorize_url(&self, request: &AuthorizeRequest) -> Result<String, IdentityProviderError> {
        let separator = if request.redirect_to.contains('?') { '&' } else { '?' };
        Ok(format!(
            "{}{separator}code={FIXTURE_AUTH_CODE}",
            request.redirect_to
        ))
    }

    async fn exchange_code(
        &self,
        exchange: &CodeExchange,
    ) -> Result<Session, IdentityProviderError> {
        if exchange.code.as_str() == FIXTURE_AUTH_CODE {
            Self::session()
        } else {
            Err(IdentityProviderError::rejected(
                "invalid flow state, no valid flow state found",
            ))
        }
    }

    async fn sign_in_with_password(
        &self,
        credentials: &PasswordCredentials,
    ) -> Result<Session, IdentityProviderError> {
        if credentials.email() == FIXTURE_EMAIL && credentials.password() == FIXTURE_PASSWORD {
            Self::session()
        } else {
            Err(IdentityProviderError::rejected("Invalid login credentials"))
        }
    }

    async fn sign_out(&self, _access_token: &AccessToken) -> Result<(), IdentityProviderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthCode, OAuthProvider};
    use rstest::rstest;

    fn exchange(code: &str) -> CodeExchange {
        CodeExchange {
            code: AuthCode::new(code).expect("code"),
            verifier: None,
        }
    }

    #[rstest]
    #[case("https://portal.example/auth/callback", "https://portal.example/auth/callback?code=abc123")]
    #[case(
        "https://portal.example/auth/callback?next=%2Fbonuses",
        "https://portal.example/auth/callback?next=%2Fbonuses&code=abc123"
    )]
    fn fixture_authorize_url_returns_to_callback(#[case] redirect_to: &str, #[case] expected: &str) {
        let request = AuthorizeRequest {
            provider: OAuthProvider::new("google").expect("provider"),
            code_challenge: "challenge".to_owned(),
            redirect_to: redirect_to.to_owned(),
        };
        let url = FixtureIdentityProvider
            .authorize_url(&request)
            .expect("fixture url");
        assert_eq!(url, expected);
    }

    #[rstest]
    #[case(FIXTURE_AUTH_CODE, true)]
    #[case("expired", false)]
    #[case("ABC123", false)]
    #[tokio::test]
    async fn fixture_exchange_accepts_only_fixture_code(#[case] code: &str, #[case] ok: bool) {
        let result = FixtureIdentityProvider.exchange_code(&exchange(code)).await;
        assert_eq!(result.is_ok(), ok);
    }

    #[rstest]
    #[case(FIXTURE_EMAIL, FIXTURE_PASSWORD, None)]
    #[case(FIXTURE_EMAIL, "wrong", Some("Invalid login credentials"))]
    #[case("someone@example.com", FIXTURE_PASSWORD, Some("Invalid login credentials"))]
    #[tokio::test]
    async fn fixture_sign_in_reports_provider_message(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected_error: Option<&str>,
    ) {
        let result = FixtureIdentityProvider
            .sign_in_with_password(&PasswordCredentials::new(email, password))
            .await;
        match (result, expected_error) {
            (Ok(session), None) => {
                assert_eq!(session.user.email.as_deref(), Some(FIXTURE_EMAIL));
            }
            (Err(err), Some(message)) => assert_eq!(err.to_string(), message),
            (other, expected) => panic!("unexpected outcome {other:?}, expected {expected:?}"),
        }
    }
}
