//! Ports connecting the session flow to the outside world.

mod client_storage;
mod identity_provider;
mod macros;

pub(crate) use macros::define_port_error;

pub use client_storage::{ClientStorage, StorageScope};
#[cfg(test)]
pub use client_storage::MockClientStorage;
pub use identity_provider::{
    FIXTURE_AUTH_CODE, FIXTURE_EMAIL, FIXTURE_PASSWORD, FixtureIdentityProvider, IdentityProvider,
    IdentityProviderError,
};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
