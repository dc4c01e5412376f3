//! Route table for the HTTP adapter.
//!
//! ```text
//! GET  /auth/authorize
//! GET  /auth/callback
//! POST /api/v1/auth/sign-in
//! POST /api/v1/auth/sign-out
//! GET  /api/v1/session
//! GET  /api/debug/env
//! GET  /api/debug/backend
//! GET  /health/ready
//! GET  /health/live
//! ```
//!
//! Callers supply `HttpState`, `Diagnostics`, and `HealthState` as app data
//! and wrap the app in session middleware.

use actix_web::web;

use crate::domain::Error;

use super::auth::{current_session, sign_in, sign_out};
use super::auth_callback::{auth_callback, authorize};
use super::diagnostics::{backend_report, env_report};
use super::health::{live, ready};

/// Register every endpoint and the body extractor error handlers.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use tutor_portal::inbound::http::routes::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|error, _req| {
        Error::invalid_request(format!("invalid JSON body: {error}")).into()
    }))
    .app_data(web::FormConfig::default().error_handler(|error, _req| {
        Error::invalid_request(format!("invalid form body: {error}")).into()
    }))
    .service(authorize)
    .service(auth_callback)
    .service(
        web::scope("/api/v1")
            .service(sign_in)
            .service(sign_out)
            .service(current_session),
    )
    .service(
        web::scope("/api/debug")
            .service(env_report)
            .service(backend_report),
    )
    .service(ready)
    .service(live);
}
