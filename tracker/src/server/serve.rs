//! HTTP server setup

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::TrackerError;
use crate::server::envelope::panic_response;
use crate::server::handlers::{
    command_handler, deploy_handler, fallback_handler, get_deployment_handler,
    get_server_handler, health_handler, list_deployments_handler, list_servers_handler,
    logs_handler, method_not_allowed_handler, monitoring_handler, rollback_handler,
};
use crate::server::state::ServerState;

/// Build the API router
pub fn router(state: Arc<ServerState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health_handler))
        // Fleet
        .route("/servers", get(list_servers_handler))
        .route("/servers/{id}", get(get_server_handler))
        // Deployments
        .route("/deployments", get(list_deployments_handler))
        .route("/deployments/{id}", get(get_deployment_handler))
        .route("/deploy", post(deploy_handler))
        .route("/rollback/{id}", post(rollback_handler))
        // Telemetry
        .route("/monitoring", get(monitoring_handler))
        .route("/logs", get(logs_handler))
        // Commands
        .route("/command", post(command_handler))
        .method_not_allowed_fallback(method_not_allowed_handler);

    Router::new()
        .nest("/api", api_routes)
        .fallback(fallback_handler)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Start the HTTP server
///
/// Returns the bound address (useful with port 0) and the server task.
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, JoinHandle<Result<(), TrackerError>>), TrackerError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| TrackerError::Server(format!("failed to bind {}: {}", addr, e)))?;
    let local_addr = listener.local_addr()?;
    info!("HTTP server listening on {}", local_addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| TrackerError::Server(e.to_string()))
    });

    Ok((local_addr, handle))
}
