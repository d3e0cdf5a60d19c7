//! REST API handlers
//!
//! Thin wrappers over the services layer. Engine rejections on the
//! refresh path are reported as successful responses carrying the
//! decision; only real failures map to error statuses.

use crate::error::{AppError, ErrorResponse};
use crate::metrics::MetricsRecord;
use crate::services::{ChainService, SnapshotResult, TrackerService, UpdateService};
use crate::state::AppState;
use crate::store::EodRecord;
use crate::symbols;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Standard response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::UnknownSymbol(_) => StatusCode::BAD_REQUEST,
            AppError::NotTracked(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyTracked(_) | AppError::CapacityExceeded => StatusCode::CONFLICT,
            AppError::SessionExpired => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Http(_) | AppError::Upstream(_) | AppError::InvalidUpstreamFormat(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let error = ErrorResponse::from(&self);
        let body = Json(json!({
            "status": "error",
            "code": error.code,
            "message": error.message,
        }));
        (status, body).into_response()
    }
}

/// Liveness plus the session health signal - GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "message": "chainwatch is running",
        "session_ready": state.session.is_ready(),
    }))
}

/// Universe symbol lists - GET /api/v1/symbols
pub async fn get_symbols() -> impl IntoResponse {
    Json(json!({
        "indices": symbols::INDICES,
        "equities": symbols::EQUITIES,
    }))
}

/// Live option-chain snapshot - GET /api/v1/option-chain/:symbol
pub async fn get_option_chain(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<SnapshotResult>>, AppError> {
    let snapshot = ChainService::fetch_snapshot(&state, &symbol).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// Persisted intraday series - GET /api/v1/symbol-data/:symbol
///
/// A plain array, newest-first; empty when no store exists.
pub async fn get_symbol_data(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Json<Vec<MetricsRecord>> {
    Json(state.series.read_all(&symbol))
}

/// Persisted EOD series - GET /api/v1/eod-data/:symbol
pub async fn get_eod_data(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Json<Vec<EodRecord>> {
    Json(state.eod.read_all(&symbol))
}

/// Tracked symbols - GET /api/v1/favorites
pub async fn list_favorites(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(TrackerService::list(&state)))
}

/// Track a symbol - POST /api/v1/favorites/:symbol
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    TrackerService::add(&state, &symbol).await?;
    Ok(Json(ApiResponse::success(TrackerService::list(&state))))
}

/// Stop tracking a symbol - DELETE /api/v1/favorites/:symbol
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    TrackerService::remove(&state, &symbol)?;
    Ok(Json(ApiResponse::success(TrackerService::list(&state))))
}

/// On-demand refresh for a tracked symbol - POST /api/v1/refresh/:symbol
pub async fn refresh_symbol(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.tracked.contains(&symbol) {
        return Err(AppError::NotTracked(symbol));
    }

    let decision = UpdateService::refresh_symbol(&state, &symbol).await?;
    info!("On-demand refresh for {}: {:?}", symbol, decision);

    Ok(Json(json!({
        "status": "success",
        "data": {"symbol": symbol, "decision": decision},
    })))
}
