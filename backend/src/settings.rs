//! Server settings loaded via OrthoConfig.
//!
//! Values come from `PORTAL_*` environment variables, matching CLI flags,
//! or a configuration file; unset values use the defaults below.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;

/// Listener and outbound settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Timeout applied to every backend request, in seconds.
    pub backend_timeout_secs: Option<u64>,
}

impl ServerSettings {
    /// Configured interface, falling back to all interfaces.
    pub fn host(&self) -> &str {
        self.host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .unwrap_or(DEFAULT_HOST)
    }

    /// Configured port, falling back to 8080.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// `(host, port)` pair for `HttpServer::bind`.
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host().to_owned(), self.port())
    }

    /// Backend request timeout; zero is raised to one second.
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(
            self.backend_timeout_secs
                .unwrap_or(DEFAULT_BACKEND_TIMEOUT_SECS)
                .max(1),
        )
    }
}
