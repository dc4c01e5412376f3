//! Domain primitives, ports, and the session bootstrap service.
//!
//! Purpose: keep the session flow free of HTTP and provider details. Types
//! here are immutable once built and document their invariants in Rustdoc.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `TraceId`: request correlation identifier.
//! - `PasswordCredentials`, `AuthCode`, `CodeVerifier`, `CodeExchange`: auth inputs.
//! - `OAuthProvider`, `AuthorizeRequest`: OAuth flow start.
//! - `Session`, `SessionSnapshot`, `UserId`: provider-owned session model.
//! - `RedirectTarget`: validated post-auth redirect location.
//! - `SessionBootstrapService`: flow start, exchange, sign-in, and sign-out operations.

pub mod auth;
pub mod error;
pub mod ports;
pub mod redirect;
pub mod session;
pub mod session_bootstrap;
pub mod trace_id;

pub use self::auth::{
    AuthCode, AuthorizeRequest, CodeExchange, CodeVerifier, EmptyAuthCode, InvalidOAuthProvider,
    OAuthProvider, PasswordCredentials,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::redirect::{AUTH_CALLBACK_ERROR, DASHBOARD_PATH, LOGIN_PATH, RedirectTarget};
pub use self::session::{
    AccessToken, RefreshToken, Session, SessionSnapshot, SessionUser, SessionValidationError,
    UserId,
};
pub use self::session_bootstrap::{
    CallbackOutcome, OAuthStart, SessionBootstrapService, SignInOutcome, SignOutOutcome, map_provider_error,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
