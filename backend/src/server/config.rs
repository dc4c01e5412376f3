//! HTTP server configuration object.

use std::sync::Arc;

use tutor_portal::domain::ports::IdentityProvider;
use tutor_portal::inbound::http::diagnostics::Diagnostics;
use tutor_portal::inbound::http::session_config::SessionSettings;

/// Everything the server factory needs, resolved before binding.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: (String, u16),
    pub(crate) provider: Arc<dyn IdentityProvider>,
    pub(crate) diagnostics: Diagnostics,
}

impl ServerConfig {
    /// Construct a server configuration from validated parts.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: (String, u16),
        provider: Arc<dyn IdentityProvider>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            session,
            bind_addr,
            provider,
            diagnostics,
        }
    }
}
