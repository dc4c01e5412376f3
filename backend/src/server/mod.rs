//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::io;

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use tutor_portal::Trace;
#[cfg(debug_assertions)]
use tutor_portal::doc::ApiDoc;
use tutor_portal::inbound::http::diagnostics::Diagnostics;
use tutor_portal::inbound::http::health::HealthState;
use tutor_portal::inbound::http::routes;
use tutor_portal::inbound::http::session_config::SessionSettings;
use tutor_portal::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    diagnostics: web::Data<Diagnostics>,
    session: web::Data<SessionSettings>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        diagnostics,
        session,
    } = deps;

    // Trace wraps last so it runs outermost and session errors carry an id.
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(diagnostics)
        .wrap(session.middleware())
        .wrap(Trace)
        .configure(routes::configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Actix's own signal handling is disabled; pair the server with
/// [`drain_on`] so liveness flips before connections are drained.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        provider,
        diagnostics,
    } = config;

    let server_health_state = health_state.clone();
    let http_state = web::Data::new(HttpState::new(provider));
    let diagnostics = web::Data::new(diagnostics);
    let session = web::Data::new(session);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            diagnostics: diagnostics.clone(),
            session: session.clone(),
        })
    })
    .disable_signals()
    .bind(bind_addr.clone())?
    .run();

    info!(host = %bind_addr.0, port = bind_addr.1, "server listening");
    health_state.mark_ready();
    Ok(server)
}

/// Resolve on Ctrl+C or, on Unix, `SIGTERM`.
///
/// # Errors
/// Returns an error when a signal handler cannot be installed.
pub async fn shutdown_signal() -> io::Result<()> {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())?.recv().await;
        Ok::<(), io::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<io::Result<()>>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        result = terminate => result,
    }
}

/// Wait for `signal`, mark the service unhealthy, then stop gracefully.
///
/// If the signal listener fails the server is left running.
pub async fn drain_on(
    signal: impl Future<Output = io::Result<()>>,
    health_state: web::Data<HealthState>,
    handle: ServerHandle,
) {
    if let Err(error) = signal.await {
        warn!(%error, "shutdown signal listener failed");
        return;
    }
    info!("shutdown requested; draining connections");
    health_state.mark_unhealthy();
    handle.stop(true).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::HttpResponse;

    fn idle_server() -> Server {
        HttpServer::new(|| App::new().default_service(web::to(|| async { HttpResponse::Ok() })))
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .expect("bind test server")
            .run()
    }

    #[actix_web::test]
    async fn shutdown_marks_unhealthy_and_stops_server() {
        let server = idle_server();
        let handle = server.handle();
        let running = actix_web::rt::spawn(server);
        let health_state = web::Data::new(HealthState::new());

        drain_on(async { Ok(()) }, health_state.clone(), handle).await;

        assert!(!health_state.is_alive());
        running
            .await
            .expect("server task joins")
            .expect("server stops cleanly");
    }

    #[actix_web::test]
    async fn failed_signal_listener_keeps_serving() {
        let server = idle_server();
        let handle = server.handle();
        let running = actix_web::rt::spawn(server);
        let health_state = web::Data::new(HealthState::new());

        drain_on(
            async { Err(io::Error::other("no signal support")) },
            health_state.clone(),
            handle.clone(),
        )
        .await;

        assert!(health_state.is_alive());
        handle.stop(false).await;
        running
            .await
            .expect("server task joins")
            .expect("server stops cleanly");
    }
}
