//! Redirect responses for the session flow.

use actix_web::HttpResponse;
use actix_web::http::{StatusCode, header};

use crate::domain::RedirectTarget;

use super::cache_control::private_no_store_header;

/// Uncacheable redirect to `target`.
///
/// GET flows use `302 Found`; form posts use `303 See Other` so the browser
/// follows with a GET.
pub fn redirect_to(status: StatusCode, target: &RedirectTarget) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((header::LOCATION, target.as_str()))
        .insert_header(private_no_store_header())
        .finish()
}

/// Uncacheable `302 Found` to an absolute URL off this origin.
///
/// Only for locations built by the server itself, never for caller input.
pub fn redirect_external(url: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, url))
        .insert_header(private_no_store_header())
        .finish()
}
