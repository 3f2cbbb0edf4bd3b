//! Route table.
//!
//! # Responsibilities
//! - Map method + path to handlers
//! - Put every matched route behind admission control
//! - Answer unmatched paths with a JSON 404
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Admission is a route layer, so unmatched paths are never counted
//! - The empty-key path is its own route so it can answer 400 instead of 404

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::http::handlers;
use crate::http::middleware::admission_middleware;
use crate::http::server::AppState;

pub const HEALTH_PATH: &str = "/health";
pub const CACHED_DATA_PATH: &str = "/api/v1/cached-data/{key}";
pub const CACHED_DATA_EMPTY_PATH: &str = "/api/v1/cached-data/";
pub const PROCESS_DATA_PATH: &str = "/api/v1/process-data";

/// Build the API routes over `state`.
pub fn api_routes(state: AppState) -> Router {
    let admission =
        middleware::from_fn_with_state(state.coordinator.clone(), admission_middleware);

    Router::new()
        .route(HEALTH_PATH, get(handlers::health))
        .route(CACHED_DATA_PATH, get(handlers::cached_data))
        .route(CACHED_DATA_EMPTY_PATH, get(handlers::missing_key))
        .route(PROCESS_DATA_PATH, post(handlers::process_data))
        .route_layer(admission)
        .fallback(handlers::not_found)
        .with_state(state)
}
