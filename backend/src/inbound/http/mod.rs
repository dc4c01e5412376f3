//! HTTP inbound adapter exposing the session flow and its diagnostics.

pub mod auth;
pub mod auth_callback;
pub mod cache_control;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod redirect;
pub mod routes;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
