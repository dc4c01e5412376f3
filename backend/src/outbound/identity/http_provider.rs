//! Reqwest-backed identity provider adapter.
//!
//! This adapter owns transport details only: grant payloads, status and
//! transport error mapping, and decoding token responses into domain
//! sessions. Provider messages pass through unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use tracing::debug;

use super::dto::{ErrorBodyDto, PasswordGrantDto, PkceGrantDto, TokenResponseDto};
use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{AccessToken, AuthorizeRequest, CodeExchange, PasswordCredentials, Session};
use crate::outbound::backend::{BackendHandle, BackendHandleError};

const PKCE_TOKEN_PATH: &str = "auth/v1/token?grant_type=pkce";
const PASSWORD_TOKEN_PATH: &str = "auth/v1/token?grant_type=password";
const LOGOUT_PATH: &str = "auth/v1/logout";
const AUTHORIZE_PATH: &str = "auth/v1/authorize";

/// Identity provider reached through the backend's auth endpoints.
pub struct HttpIdentityProvider {
    backend: BackendHandle,
    clock: Arc<dyn Clock>,
}

impl HttpIdentityProvider {
    /// Build the adapter over a shared backend handle.
    ///
    /// `clock` resolves relative token lifetimes into absolute expiries.
    pub fn new(backend: BackendHandle, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    async fn token_grant<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Session, IdentityProviderError> {
        let response = self
            .backend
            .request(Method::POST, path)
            .map_err(map_handle_error)?
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        let body = successful_body(response).await?;
        let token: TokenResponseDto = serde_json::from_slice(&body).map_err(|error| {
            IdentityProviderError::decode(format!("invalid token payload: {error}"))
        })?;
        token
            .into_session(self.clock.utc())
            .map_err(IdentityProviderError::decode)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    fn authorize_url(&self, request: &AuthorizeRequest) -> Result<String, IdentityProviderError> {
        let mut url = self
            .backend
            .endpoint(AUTHORIZE_PATH)
            .map_err(map_handle_error)?;
        url.query_pairs_mut()
            .append_pair("provider", request.provider.as_str())
            .append_pair("redirect_to", &request.redirect_to)
            .append_pair("code_challenge", &request.code_challenge)
            .append_pair("code_challenge_method", "s256");
        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        exchange: &CodeExchange,
    ) -> Result<Session, IdentityProviderError> {
        let grant = PkceGrantDto {
            auth_code: exchange.code.as_str(),
            code_verifier: exchange.verifier.as_ref().map(|verifier| verifier.as_str()),
        };
        self.token_grant(PKCE_TOKEN_PATH, &grant).await
    }

    async fn sign_in_with_password(
        &self,
        credentials: &PasswordCredentials,
    ) -> Result<Session, IdentityProviderError> {
        let grant = PasswordGrantDto {
            email: credentials.email(),
            password: credentials.password(),
        };
        self.token_grant(PASSWORD_TOKEN_PATH, &grant).await
    }

    async fn sign_out(&self, access_token: &AccessToken) -> Result<(), IdentityProviderError> {
        let response = self
            .backend
            .request_as_user(Method::POST, LOGOUT_PATH, access_token.expose())
            .map_err(map_handle_error)?
            .send()
            .await
            .map_err(map_transport_error)?;
        successful_body(response).await.map(|_| ())
    }
}

async fn successful_body(response: Response) -> Result<Vec<u8>, IdentityProviderError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if status.is_success() {
        Ok(body.to_vec())
    } else {
        debug!(status = status.as_u16(), body = %body_preview(&body), "identity provider refused request");
        Err(map_status_error(status, &body))
    }
}

fn map_handle_error(error: BackendHandleError) -> IdentityProviderError {
    match error {
        BackendHandleError::InvalidBearer => IdentityProviderError::rejected(error.to_string()),
        other => IdentityProviderError::unavailable(other.to_string()),
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    if error.is_timeout() {
        IdentityProviderError::unavailable(format!("request timed out: {error}"))
    } else {
        IdentityProviderError::unavailable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let message = serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(ErrorBodyDto::into_message)
        .unwrap_or_else(|| {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                format!("status {}: {preview}", status.as_u16())
            }
        });

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            IdentityProviderError::unavailable(message)
        }
        _ if status.is_client_error() => IdentityProviderError::rejected(message),
        _ => IdentityProviderError::unavailable(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Mapping helpers; the network paths are covered in `identity::tests`.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::description(br#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#, "Invalid login credentials")]
    #[case::msg(br#"{"code":400,"msg":"invalid flow state, no valid flow state found"}"#, "invalid flow state, no valid flow state found")]
    #[case::message(br#"{"message":"Email not confirmed"}"#, "Email not confirmed")]
    #[case::padded_text_kept(br#"{"error_description":"  Password should be at least 6 characters. ","msg":"other"}"#, "  Password should be at least 6 characters. ")]
    #[case::blank_description_skipped(br#"{"error_description":"  ","msg":"Email rate limit exceeded"}"#, "Email rate limit exceeded")]
    #[case::bare_error(br#"{"error":"invalid_grant"}"#, "invalid_grant")]
    #[case::not_json(b"upstream says no", "status 400: upstream says no")]
    #[case::empty(b"", "status 400")]
    fn client_errors_carry_provider_message(#[case] body: &[u8], #[case] expected: &str) {
        let error = map_status_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(error, IdentityProviderError::Rejected { .. }));
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case(StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(StatusCode::BAD_GATEWAY)]
    #[case(StatusCode::TOO_MANY_REQUESTS)]
    fn server_and_throttle_statuses_are_unavailable(#[case] status: StatusCode) {
        let error = map_status_error(status, b"");
        assert!(matches!(error, IdentityProviderError::Unavailable { .. }));
    }

    #[test]
    fn previews_are_compacted_and_truncated() {
        let body = format!("a  b\n{}", "x".repeat(200));
        let preview = body_preview(body.as_bytes());
        assert!(preview.starts_with("a b x"));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }
}
