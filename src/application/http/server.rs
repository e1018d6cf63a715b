//! HTTP server lifecycle: bind, serve, shut down on Ctrl-C
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::routes;
use super::state::AppState;
use crate::shared::errors::AppError;

/// Serve the API until the process receives Ctrl-C
pub async fn start_server(state: Arc<AppState>, host: &str, port: u16) -> Result<(), AppError> {
    info!("🌐 Starting HTTP server on {}:{}", host, port);

    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| AppError::ServerError(format!("Invalid bind address {}:{}: {}", host, port, e)))?;

    let listener = TcpListener::bind(&addr).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => {
            AppError::ServerError(format!("Failed to bind to {}: address already in use", addr))
        }
        _ => AppError::ServerError(format!("Failed to bind to {}: {}", addr, e)),
    })?;

    info!("✅ Listening on http://{}", addr);
    info!("📊 Endpoints: POST /api/swap, POST /api/liquidity, GET /api/quote, GET /api/tokens");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::ServerError(format!("Server error: {}", e)))?;

    info!("✅ HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("⚠️ Ctrl-C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received, stopping server...");
}

/// Router with tracing and CORS middleware
pub fn build_app(state: Arc<AppState>) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
