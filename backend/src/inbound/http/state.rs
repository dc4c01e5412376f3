//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without I/O.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::SessionBootstrapService;
use crate::domain::ports::IdentityProvider;

/// Dependency bundle for the session handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Session bootstrap use-cases.
    pub bootstrap: SessionBootstrapService,
    /// Clock used to judge session expiry.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct state around an identity provider with the system clock.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use tutor_portal::domain::ports::FixtureIdentityProvider;
    /// use tutor_portal::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureIdentityProvider));
    /// let _bootstrap = state.bootstrap.clone();
    /// ```
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::with_clock(provider, Arc::new(DefaultClock))
    }

    /// Construct state with an explicit clock.
    pub fn with_clock(provider: Arc<dyn IdentityProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            bootstrap: SessionBootstrapService::new(provider),
            clock,
        }
    }
}
