//! Tutor portal session bootstrap library.
//!
//! Domain types and the session bootstrap service live in [`domain`]; the
//! HTTP adapter in [`inbound`]; the identity provider client in [`outbound`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
