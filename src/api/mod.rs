//! HTTP API
//!
//! JSON endpoints for the dashboard:
//! - POST /api/start_monitoring, /api/stop_monitoring
//! - GET /api/current_data/{security_id}, /api/delta_data/{security_id}
//! - GET /api/summary/{security_id}?lookback_minutes=N
//! - GET /api/instruments, /health

mod error;
mod handlers;
mod view;

pub use error::ApiError;
pub use handlers::{StartRequest, StatusResponse, StopRequest, DEFAULT_LOOKBACK_MINUTES};
pub use view::{DashboardView, DeltaView, LargeOrdersView, LevelView, OrderBookView};

use crate::config::{MonitorConfig, ServerConfig};
use crate::monitor::MonitoringRegistry;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MonitoringRegistry>,
    /// Applied to start requests that omit segment or interval
    pub defaults: MonitorConfig,
}

impl AppState {
    pub fn new(registry: Arc<MonitoringRegistry>, defaults: MonitorConfig) -> Self {
        Self { registry, defaults }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/start_monitoring", post(handlers::start_monitoring))
        .route("/api/stop_monitoring", post(handlers::stop_monitoring))
        .route("/api/current_data/{security_id}", get(handlers::current_data))
        .route("/api/delta_data/{security_id}", get(handlers::delta_data))
        .route("/api/summary/{security_id}", get(handlers::summary))
        .route("/api/instruments", get(handlers::instruments))
        .layer(cors)
        .with_state(state)
}

/// Serve the API until ctrl-c, then stop all monitoring
pub async fn serve(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let registry = Arc::clone(&state.registry);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received shutdown signal (Ctrl+C)"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for shutdown signal");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    registry.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}
