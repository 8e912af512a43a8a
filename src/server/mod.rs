//! HTTP JSON API
//!
//! Thin axum layer over the catalog, search and metrics services. All
//! routes are GET except the two refresh aliases.

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::cache::TokenCatalog;
use crate::error::Result;
use crate::metrics::MetricsService;

/// Shared state handed to every handler
pub struct AppState {
    pub catalog: Arc<TokenCatalog>,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(catalog: Arc<TokenCatalog>, metrics: Arc<MetricsService>) -> Self {
        Self { catalog, metrics }
    }
}

/// Build the router with CORS applied
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/search", get(handlers::search))
        .route("/api/token-metrics", get(handlers::token_metrics))
        .route("/api/tokens/refresh", post(handlers::refresh))
        .route("/api/refresh-cache", post(handlers::refresh))
        .route("/api/tokens/status", get(handlers::status))
        .route("/api/cache-status", get(handlers::status))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(cors)
}

/// Serve until Ctrl-C
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("tokencompare listening on {}", listener.local_addr()?);
    log::info!(
        "Endpoints: GET /api/search, GET /api/token-metrics, POST /api/tokens/refresh, \
         GET /api/tokens/status, GET /health"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
