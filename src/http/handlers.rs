//! Request handlers.
//!
//! # Data Flow
//! ```text
//! GET  /health                    → 200 {"status":"healthy"} (no backend call)
//! GET  /api/v1/cached-data/{key}  → LookupKey → CacheBackend::lookup
//!                                     Hit          → 200 {"data": value}
//!                                     Miss         → 404 {"error":"Data not found"}
//!                                     BackendError → 500 {"error":"Internal server error"}
//! GET  /api/v1/cached-data/       → 400 (empty key)
//! POST /api/v1/process-data       → validate → simulated work → 200
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use crate::cache::{EmptyKey, LookupKey, LookupOutcome};
use crate::http::response::{
    ApiError, DataResponse, HealthResponse, ProcessRequest, ProcessResponse,
};
use crate::http::server::AppState;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

pub async fn cached_data(
    State(state): State<AppState>,
    key: Result<Path<String>, PathRejection>,
) -> Result<Json<DataResponse>, ApiError> {
    let Path(raw) = key.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let key = LookupKey::new(raw).map_err(|e| ApiError::Validation(e.to_string()))?;

    match state.cache.lookup(&key).await {
        LookupOutcome::Hit(value) => {
            tracing::debug!(key = %key, "Cache hit");
            Ok(Json(DataResponse { data: value }))
        }
        LookupOutcome::Miss => {
            tracing::debug!(key = %key, "Cache miss");
            Err(ApiError::DataNotFound)
        }
        LookupOutcome::BackendError(e) => {
            tracing::error!(
                key = %key,
                backend = state.cache.kind(),
                error = %e,
                "Failed to get data from cache"
            );
            Err(ApiError::Internal)
        }
    }
}

/// `GET /api/v1/cached-data/` with nothing after the slash.
pub async fn missing_key() -> ApiError {
    ApiError::Validation(EmptyKey.to_string())
}

pub async fn process_data(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    if request.input.is_empty() {
        return Err(ApiError::Validation("input is required".to_string()));
    }

    // Stand-in for real work.
    tokio::time::sleep(state.compute_delay).await;

    tracing::debug!(input_len = request.input.len(), "Processed data");
    Ok(Json(ProcessResponse {
        processed: true,
        input: request.input,
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
