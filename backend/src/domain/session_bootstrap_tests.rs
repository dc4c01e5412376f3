//! Behaviour coverage for the session bootstrap flow.

use std::sync::{Arc, Mutex};

use mockall::predicate::always;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockClientStorage, MockIdentityProvider};
use crate::domain::{ErrorCode, SessionUser, UserId};

#[fixture]
fn session() -> Session {
    Session {
        access_token: AccessToken::new("access-token").expect("token"),
        refresh_token: None,
        expires_at: None,
        user: SessionUser {
            id: UserId::new("user-1").expect("user id"),
            email: Some("tutor@example.com".to_owned()),
        },
    }
}

fn service(provider: MockIdentityProvider) -> SessionBootstrapService {
    SessionBootstrapService::new(Arc::new(provider))
}

#[rstest]
#[case(None, "/dashboard")]
#[case(Some("/gamification"), "/gamification")]
#[case(Some("https://evil.example"), "/dashboard")]
#[tokio::test]
async fn valid_code_redirects_to_next(
    session: Session,
    #[case] next: Option<&str>,
    #[case] expected: &str,
) {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_exchange_code()
        .withf(|exchange| exchange.code.as_str() == "abc123" && exchange.verifier.is_none())
        .times(1)
        .return_once(move |_| Ok(session));

    let outcome = service(provider)
        .exchange_code_for_session(Some("abc123"), next, None)
        .await;

    assert!(matches!(outcome, CallbackOutcome::Established { .. }));
    assert_eq!(outcome.redirect().as_str(), expected);
}

#[rstest]
#[case(IdentityProviderError::rejected("invalid flow state"))]
#[case(IdentityProviderError::unavailable("connection refused"))]
#[case(IdentityProviderError::decode("missing user"))]
#[tokio::test]
async fn failed_exchange_redirects_to_login_error(#[case] error: IdentityProviderError) {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_exchange_code()
        .times(1)
        .return_once(move |_| Err(error));

    let outcome = service(provider)
        .exchange_code_for_session(Some("expired"), Some("/gamification"), None)
        .await;

    assert!(matches!(outcome, CallbackOutcome::Failed { .. }));
    assert_eq!(outcome.redirect().as_str(), "/login?error=auth_callback_error");
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("   "))]
#[tokio::test]
async fn missing_code_never_reaches_provider(#[case] code: Option<&str>) {
    let mut provider = MockIdentityProvider::new();
    provider.expect_exchange_code().never();

    let outcome = service(provider)
        .exchange_code_for_session(code, None, None)
        .await;

    assert_eq!(outcome.redirect().as_str(), "/login?error=auth_callback_error");
}

#[rstest]
#[tokio::test]
async fn stored_verifier_is_forwarded(session: Session) {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_exchange_code()
        .withf(|exchange| {
            exchange
                .verifier
                .as_ref()
                .is_some_and(|verifier| verifier.as_str() == "verifier")
        })
        .return_once(move |_| Ok(session));

    let outcome = service(provider)
        .exchange_code_for_session(Some("abc123"), None, CodeVerifier::new("verifier"))
        .await;

    assert_eq!(outcome.redirect().as_str(), "/dashboard");
}

const CALLBACK: &str = "https://portal.example/auth/callback";

#[rstest]
#[case(None, "https://portal.example/auth/callback?next=%2Fdashboard")]
#[case(Some("/bonuses?tab=rates"), "https://portal.example/auth/callback?next=%2Fbonuses%3Ftab%3Drates")]
#[case(Some("https://evil.example"), "https://portal.example/auth/callback?next=%2Fdashboard")]
fn oauth_start_sends_challenge_of_kept_verifier(
    #[case] next: Option<&str>,
    #[case] expected_redirect: &'static str,
) {
    let seen = Arc::new(Mutex::new(None));
    let recorded = Arc::clone(&seen);
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_authorize_url()
        .times(1)
        .returning(move |request| {
            *recorded.lock().expect("request lock") = Some(request.clone());
            Ok("https://idp.example/authorize".to_owned())
        });

    let start = service(provider)
        .begin_oauth("google", next, CALLBACK)
        .expect("flow starts");

    let request = seen.lock().expect("request lock").take().expect("request");
    assert_eq!(start.authorize_url, "https://idp.example/authorize");
    assert_eq!(request.provider.as_str(), "google");
    assert_eq!(request.redirect_to, expected_redirect);
    assert_eq!(request.code_challenge, start.verifier.challenge());
    assert_ne!(request.code_challenge, start.verifier.as_str());
}

#[rstest]
fn unknown_provider_shape_is_invalid_request() {
    let mut provider = MockIdentityProvider::new();
    provider.expect_authorize_url().never();

    let error = service(provider)
        .begin_oauth("Google Workspace", None, CALLBACK)
        .expect_err("provider rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn authorise_url_failure_is_mapped() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_authorize_url()
        .return_once(|_| Err(IdentityProviderError::unavailable("backend url unusable")));

    let error = service(provider)
        .begin_oauth("google", None, CALLBACK)
        .expect_err("flow fails");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn sign_in_redirects_to_dashboard(session: Session) {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in_with_password()
        .withf(|creds| creds.email() == "tutor@example.com" && creds.password() == "pw")
        .return_once(move |_| Ok(session));

    let outcome = service(provider)
        .sign_in_with_password(&PasswordCredentials::new("tutor@example.com", "pw"))
        .await
        .expect("sign-in succeeds");

    assert_eq!(outcome.redirect.as_str(), "/dashboard");
    assert_eq!(outcome.session.user.id.as_ref(), "user-1");
}

#[rstest]
#[tokio::test]
async fn sign_in_rejection_keeps_provider_message() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in_with_password()
        .return_once(|_| Err(IdentityProviderError::rejected("Invalid login credentials")));

    let error = service(provider)
        .sign_in_with_password(&PasswordCredentials::new("tutor@example.com", "wrong"))
        .await
        .expect_err("sign-in fails");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "Invalid login credentials");
}

#[rstest]
#[tokio::test]
async fn sign_in_outage_is_service_unavailable() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in_with_password()
        .return_once(|_| Err(IdentityProviderError::unavailable("timed out")));

    let error = service(provider)
        .sign_in_with_password(&PasswordCredentials::new("a", "b"))
        .await
        .expect_err("sign-in fails");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

/// Records provider and storage calls in one ordered log.
fn recording_storage(log: Arc<Mutex<Vec<String>>>) -> MockClientStorage {
    let mut storage = MockClientStorage::new();
    storage.expect_clear().with(always()).times(2).returning(move |scope| {
        log.lock().expect("log lock").push(format!("clear {scope:?}"));
        Ok(())
    });
    storage
}

#[rstest]
#[case(Ok(()), true)]
#[case(Err(IdentityProviderError::unavailable("down")), false)]
#[case(Err(IdentityProviderError::rejected("session not found")), false)]
#[tokio::test]
async fn sign_out_clears_storage_after_provider_call(
    #[case] provider_result: Result<(), IdentityProviderError>,
    #[case] revoked: bool,
) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let provider_log = Arc::clone(&log);
    let mut provider = MockIdentityProvider::new();
    provider.expect_sign_out().times(1).return_once(move |_| {
        provider_log
            .lock()
            .expect("log lock")
            .push("provider sign-out".to_owned());
        provider_result
    });
    let storage = recording_storage(Arc::clone(&log));
    let token = AccessToken::new("access-token").expect("token");

    let outcome = service(provider)
        .sign_out(Some(&token), &storage)
        .await
        .expect("sign-out succeeds");

    assert_eq!(outcome.redirect.as_str(), "/login");
    assert_eq!(outcome.provider_revoked, revoked);
    assert_eq!(
        *log.lock().expect("log lock"),
        vec!["provider sign-out", "clear Local", "clear Session"]
    );
}

#[rstest]
#[tokio::test]
async fn sign_out_without_session_still_clears_storage() {
    let mut provider = MockIdentityProvider::new();
    provider.expect_sign_out().never();
    let log = Arc::new(Mutex::new(Vec::new()));
    let storage = recording_storage(Arc::clone(&log));

    let outcome = service(provider)
        .sign_out(None, &storage)
        .await
        .expect("sign-out succeeds");

    assert!(!outcome.provider_revoked);
    assert_eq!(log.lock().expect("log lock").len(), 2);
}

#[rstest]
#[tokio::test]
async fn storage_failure_is_surfaced() {
    let mut provider = MockIdentityProvider::new();
    provider.expect_sign_out().return_once(|_| Ok(()));
    let mut storage = MockClientStorage::new();
    storage
        .expect_clear()
        .returning(|_| Err(Error::internal("cookie purge failed")));
    let token = AccessToken::new("access-token").expect("token");

    let error = service(provider)
        .sign_out(Some(&token), &storage)
        .await
        .expect_err("sign-out fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
}
