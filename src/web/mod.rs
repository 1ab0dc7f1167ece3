//! HTTP service
//!
//! Routes:
//! - `POST /export` - start a full export, answered with `202` and the new job
//! - `GET /job` - the current job
//! - `GET /__health`, `GET /__gtg`, `GET /__build-info` - operational endpoints

use crate::config::ServerConfig;
use crate::domain::{ExporterError, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod handlers;
pub mod health;
pub mod state;


pub use state::AppState;

/// Builds the router with tracing and a per-request timeout
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/export", post(handlers::export))
        .route("/job", get(handlers::get_job))
        .route("/__health", get(health::health))
        .route("/__gtg", get(health::good_to_go))
        .route("/__build-info", get(health::build_info))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Serves the router until `shutdown` turns true
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let address = config.listen_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| ExporterError::Io(format!("Failed to bind {address}: {e}")))?;

    tracing::info!(address = %address, "HTTP server listening");

    let router = create_router(state, Duration::from_secs(config.request_timeout_seconds));
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
            tracing::info!("HTTP server shutting down");
        })
        .await
        .map_err(|e| ExporterError::Io(format!("HTTP server error: {e}")))
}
