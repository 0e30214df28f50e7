//! HTTP server for kubegraph

mod error;
mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, patch};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

use kubegraph_k8s::ClusterSource;

/// State shared read-only by every request handler
#[derive(Clone)]
pub struct AppState {
    pub cluster: Arc<dyn ClusterSource>,
    /// How far back the logs endpoint reads
    pub log_since_seconds: i64,
}

impl AppState {
    pub fn new(cluster: Arc<dyn ClusterSource>, log_since_seconds: i64) -> Self {
        Self {
            cluster,
            log_since_seconds,
        }
    }
}

/// Build the API router, mounted under `prefix`
pub fn router(state: AppState, prefix: &str) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/namespaces", get(handlers::namespaces))
        .route("/deployments", get(handlers::list_deployments))
        .route("/deployments/{namespace}/{name}", get(handlers::get_deployment))
        .route("/pods", get(handlers::list_pods))
        .route("/pods/metadata", patch(handlers::patch_pod_metadata))
        .route("/pods/{namespace}/{name}", get(handlers::get_pod))
        .route("/services", get(handlers::list_services))
        .route("/logs", get(handlers::pod_logs))
        .route("/graph", get(handlers::graph))
        .with_state(state);

    let app = match normalize_prefix(prefix) {
        Some(prefix) => Router::new().nest(&prefix, api),
        None => api,
    };

    // One span and one completion line per request at the default level
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    app.layer(trace).layer(CorsLayer::permissive())
}

/// Normalize a route prefix to `/segment` form; `None` mounts at the root
fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim().trim_matches('/');
    (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
}

/// Serve until Ctrl-C
pub async fn serve(app: Router, address: &str) -> Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(address = %address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
