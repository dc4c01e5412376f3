//! OAuth flow handlers.
//!
//! ```text
//! GET /auth/authorize?provider=google&next=/dashboard/bonuses
//! GET /auth/callback?code=abc123&next=/dashboard/bonuses
//! ```
//!
//! `authorize` keeps a PKCE verifier in the session and sends the browser to
//! the provider; `auth_callback` exchanges the one-time code for a session
//! and redirects. Failures never render an error page; they land on the
//! login page with a flag instead.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::Deserialize;
use tracing::warn;
use utoipa::IntoParams;

use crate::domain::{CallbackOutcome, Error, RedirectTarget, Session};
use crate::inbound::http::redirect::{redirect_external, redirect_to};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query parameters accepted when starting an OAuth sign-in.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthorizeQuery {
    /// OAuth provider name, e.g. `google`.
    pub provider: Option<String>,
    /// Relative path to continue to after sign-in.
    pub next: Option<String>,
}

fn callback_failed() -> HttpResponse {
    redirect_to(
        StatusCode::FOUND,
        &RedirectTarget::login_with_callback_error(),
    )
}

/// Start an OAuth sign-in with PKCE.
#[utoipa::path(
    get,
    path = "/auth/authorize",
    params(AuthorizeQuery),
    responses(
        (status = 302, description = "Redirect to the provider's authorise page, or to `/login?error=auth_callback_error`",
            headers(
                ("Location" = String, description = "Redirect target"),
                ("Set-Cookie" = String, description = "Session cookie holding the PKCE verifier")
            ))
    ),
    tags = ["auth"],
    operation_id = "authAuthorize",
    security([])
)]
#[get("/auth/authorize")]
pub async fn authorize(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AuthorizeQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let callback = match req.url_for_static("auth_callback") {
        Ok(url) => url,
        Err(error) => {
            warn!(%error, "could not resolve the auth callback URL");
            return callback_failed();
        }
    };

    let started = state
        .bootstrap
        .begin_oauth(
            query.provider.as_deref().unwrap_or_default(),
            query.next.as_deref(),
            callback.as_str(),
        )
        .and_then(|start| {
            session.store_code_verifier(&start.verifier)?;
            Ok(start.authorize_url)
        });
    match started {
        Ok(url) => redirect_external(&url),
        Err(error) => {
            warn!(%error, "could not start OAuth sign-in");
            callback_failed()
        }
    }
}

/// Query parameters appended by the identity provider.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// One-time authorisation code.
    pub code: Option<String>,
    /// Relative path to continue to after sign-in.
    pub next: Option<String>,
    /// Error code set by the provider when the flow was aborted upstream.
    pub error: Option<String>,
    /// Provider description accompanying `error`.
    pub error_description: Option<String>,
}

/// Complete the OAuth flow started on the login page.
#[utoipa::path(
    get,
    path = "/auth/callback",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Redirect to `next` (default `/dashboard`) or to `/login?error=auth_callback_error`",
            headers(
                ("Location" = String, description = "Redirect target"),
                ("Set-Cookie" = String, description = "Session cookie on success")
            )),
    ),
    tags = ["auth"],
    operation_id = "authCallback",
    security([])
)]
#[get("/auth/callback")]
pub async fn auth_callback(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    if let Some(error) = query.error.as_deref() {
        warn!(
            error,
            description = query.error_description.as_deref().unwrap_or_default(),
            "identity provider aborted the auth flow"
        );
        return callback_failed();
    }

    let outcome = state
        .bootstrap
        .exchange_code_for_session(
            query.code.as_deref(),
            query.next.as_deref(),
            session.code_verifier(),
        )
        .await;
    complete_callback(&outcome, |issued| session.persist(issued))
}

/// Store an established session and redirect; a session that cannot be
/// stored is reported like a failed exchange.
fn complete_callback(
    outcome: &CallbackOutcome,
    persist: impl FnOnce(&Session) -> Result<(), Error>,
) -> HttpResponse {
    if let CallbackOutcome::Established { session, .. } = outcome {
        if let Err(error) = persist(session.as_ref()) {
            warn!(%error, "could not store session after code exchange");
            return callback_failed();
        }
    }
    redirect_to(StatusCode::FOUND, outcome.redirect())
}
