//! Driven port for browser-visible session storage.
//!
//! Sign-out must leave no cached session state behind. Adapters decide how
//! each scope is cleared; the domain only guarantees both are cleared before
//! the redirect is issued.

use crate::domain::Error;

/// Storage scopes cleared on sign-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Durable storage that survives browser restarts.
    Local,
    /// Storage scoped to the current browsing session.
    Session,
}

impl StorageScope {
    /// Every scope, in the order sign-out clears them.
    pub const ALL: [Self; 2] = [Self::Local, Self::Session];
}

/// Storage that holds per-user session state.
#[cfg_attr(test, mockall::automock)]
pub trait ClientStorage {
    /// Remove everything stored under `scope`.
    fn clear(&self, scope: StorageScope) -> Result<(), Error>;
}
