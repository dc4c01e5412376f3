//! Password sign-in, sign-out, and session snapshot handlers.
//!
//! ```text
//! POST /api/v1/auth/sign-in {"email":"tutor@example.com","password":"password"}
//! POST /api/v1/auth/sign-out
//! GET  /api/v1/session
//! ```

use actix_web::http::StatusCode;
use actix_web::http::header::HeaderValue;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::{Error, PasswordCredentials, SessionSnapshot};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::{
    CLEAR_SITE_DATA, CLEAR_SITE_DATA_CACHE_AND_STORAGE, private_no_store_header,
};
use crate::inbound::http::redirect::redirect_to;
use crate::inbound::http::session::{BrowserStorage, SessionContext};
use crate::inbound::http::state::HttpState;

/// Sign-in request body for `POST /api/v1/auth/sign-in`.
///
/// Accepted as JSON or as an urlencoded form. Values are forwarded to the
/// identity provider as submitted.
///
/// Example JSON:
/// `{"email":"tutor@example.com","password":"password"}`
#[derive(Deserialize, Serialize, ToSchema)]
pub struct SignInRequest {
    /// Account email.
    #[schema(example = "tutor@example.com")]
    pub email: String,
    /// Account password.
    #[schema(example = "password")]
    pub password: String,
}

impl From<SignInRequest> for PasswordCredentials {
    fn from(value: SignInRequest) -> Self {
        Self::new(value.email, value.password)
    }
}

/// Sign in with email and password.
///
/// On rejection the provider's message is returned unchanged so the login
/// form can display it; nothing is redirected.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 303, description = "Signed in; continue to `/dashboard`",
            headers(
                ("Location" = String, description = "Always `/dashboard`"),
                ("Set-Cookie" = String, description = "Session cookie")
            )),
        (status = 400, description = "Malformed body", body = Error),
        (status = 401, description = "Provider rejected the credentials", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/auth/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Either<web::Json<SignInRequest>, web::Form<SignInRequest>>,
) -> ApiResult<HttpResponse> {
    let credentials = PasswordCredentials::from(payload.into_inner());
    let outcome = state.bootstrap.sign_in_with_password(&credentials).await?;
    session.persist(&outcome.session)?;
    Ok(redirect_to(StatusCode::SEE_OTHER, &outcome.redirect))
}

/// Sign out and clear browser state.
///
/// Always redirects to `/login`, even when the provider could not be
/// reached. The response purges the session cookie and asks the browser to
/// drop cached pages and web storage.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-out",
    responses(
        (status = 303, description = "Signed out; continue to `/login`",
            headers(
                ("Location" = String, description = "Always `/login`"),
                ("Clear-Site-Data" = String, description = "`\"cache\", \"storage\"`")
            )),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signOut",
    security([])
)]
#[post("/auth/sign-out")]
pub async fn sign_out(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let current = session.session().unwrap_or_else(|error| {
        warn!(%error, "unreadable session during sign-out");
        None
    });
    let storage = BrowserStorage::new(&session);
    let outcome = state
        .bootstrap
        .sign_out(current.as_ref().map(|s| &s.access_token), &storage)
        .await?;

    let mut response = redirect_to(StatusCode::SEE_OTHER, &outcome.redirect);
    if storage.clear_site_data() {
        response.headers_mut().insert(
            CLEAR_SITE_DATA,
            HeaderValue::from_static(CLEAR_SITE_DATA_CACHE_AND_STORAGE),
        );
    }
    Ok(response)
}

/// Read-only snapshot of the signed-in session.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses(
        (status = 200, description = "Current session", body = SessionSnapshot),
        (status = 401, description = "No session or session expired", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentSession"
)]
#[get("/session")]
pub async fn current_session(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let snapshot = session.require_snapshot(state.clock.utc())?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(snapshot))
}
