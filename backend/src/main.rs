//! Tutor portal entry-point: loads settings, picks an identity provider, and
//! serves the session endpoints.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server, drain_on, shutdown_signal};
use tutor_portal::domain::ports::{FixtureIdentityProvider, IdentityProvider};
use tutor_portal::inbound::http::diagnostics::Diagnostics;
use tutor_portal::inbound::http::health::HealthState;
use tutor_portal::inbound::http::session_config::fingerprint::key_fingerprint;
use tutor_portal::inbound::http::session_config::{BuildMode, session_settings_from_env};
use tutor_portal::outbound::backend::{BackendConfig, BackendHandle};
use tutor_portal::outbound::identity::HttpIdentityProvider;
use tutor_portal::settings::ServerSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|error| io::Error::other(error.to_string()))?;
    let env = DefaultEnv::new();
    let mode = BuildMode::from_debug_assertions();

    let session = session_settings_from_env(&env, mode).map_err(io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let provider = identity_provider(&env, mode, &settings)?;
    let diagnostics = Diagnostics::collect(&env, settings.backend_timeout());

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(session, settings.bind_addr(), provider, diagnostics);
    let server = create_server(health_state.clone(), config)?;
    actix_web::rt::spawn(drain_on(shutdown_signal(), health_state, server.handle()));
    server.await
}

/// Build the HTTP identity provider, or fall back to the fixture in debug
/// builds when the backend is not configured.
fn identity_provider(
    env: &DefaultEnv,
    mode: BuildMode,
    settings: &ServerSettings,
) -> io::Result<Arc<dyn IdentityProvider>> {
    let handle = BackendConfig::from_env(env)
        .map_err(io::Error::other)
        .and_then(|config| {
            BackendHandle::new(&config, settings.backend_timeout()).map_err(io::Error::other)
        });

    match handle {
        Ok(handle) => {
            info!(host = ?handle.base_url().host_str(), "identity provider configured");
            Ok(Arc::new(HttpIdentityProvider::new(
                handle,
                Arc::new(DefaultClock),
            )))
        }
        Err(error) if mode == BuildMode::Debug => {
            warn!(%error, "backend not configured; using fixture identity provider");
            Ok(Arc::new(FixtureIdentityProvider))
        }
        Err(error) => Err(error),
    }
}
