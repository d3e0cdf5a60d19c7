//! HTTP API
//!
//! Serves the persisted stores and the live snapshot path to the
//! frontend. CORS is wide open: the dashboard is served from a separate
//! origin during development.

pub mod handlers;

pub use handlers::ApiResponse;

use crate::error::Result;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::health_check))
        .route("/api/v1/symbols", get(handlers::get_symbols))
        .route("/api/v1/option-chain/:symbol", get(handlers::get_option_chain))
        .route("/api/v1/symbol-data/:symbol", get(handlers::get_symbol_data))
        .route("/api/v1/eod-data/:symbol", get(handlers::get_eod_data))
        .route("/api/v1/favorites", get(handlers::list_favorites))
        .route(
            "/api/v1/favorites/:symbol",
            post(handlers::add_favorite).delete(handlers::remove_favorite),
        )
        .route("/api/v1/refresh/:symbol", post(handlers::refresh_symbol))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve the API until interrupted
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = state.config.bind_addr()?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
