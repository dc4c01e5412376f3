//! Shared cache-control policies for HTTP handlers.

use actix_web::http::header::{self, HeaderName};

/// Auth redirects, session payloads, and diagnostics must never be stored.
pub const PRIVATE_NO_STORE: &str = "private, no-store";

/// `Clear-Site-Data` response header.
pub const CLEAR_SITE_DATA: HeaderName = HeaderName::from_static("clear-site-data");

/// Directive sent on sign-out so the browser drops cached pages and storage.
pub const CLEAR_SITE_DATA_CACHE_AND_STORAGE: &str = "\"cache\", \"storage\"";

/// Standard cache-control header tuple for private responses.
pub const fn private_no_store_header() -> (HeaderName, &'static str) {
    (header::CACHE_CONTROL, PRIVATE_NO_STORE)
}
