//! Connection to the external backend service.
//!
//! [`BackendConfig`] validates the environment and [`BackendHandle`] wraps
//! the HTTP client every outbound adapter shares.

mod config;
mod handle;

pub use config::{ApiKey, BACKEND_API_KEY_ENV, BACKEND_URL_ENV, BackendConfig, BackendConfigError};
pub use handle::{BackendHandle, BackendHandleError};
