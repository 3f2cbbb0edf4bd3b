//! Response bodies and error mapping.
//!
//! # Responsibilities
//! - Define the JSON bodies the API returns
//! - Map failures to status codes with a fixed `{"error": ...}` body
//!
//! # Design Decisions
//! - Backend failures render a generic message; the cause is only logged
//! - Validation messages are safe to echo back

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// A cache hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse {
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub processed: bool,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Every failure a handler can return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The key has no value in the cache.
    DataNotFound,
    /// No route matches the path.
    RouteNotFound,
    /// The request was malformed.
    Validation(String),
    /// The backend failed.
    Internal,
    /// The request arrived after draining started.
    ShuttingDown,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DataNotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::DataNotFound => "Data not found",
            ApiError::RouteNotFound => "Not found",
            ApiError::Validation(message) => message,
            ApiError::Internal => "Internal server error",
            ApiError::ShuttingDown => "Service is shutting down",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message().to_string(),
        };
        let mut response = (status, Json(body)).into_response();

        if matches!(self, ApiError::ShuttingDown) {
            response
                .headers_mut()
                .insert(header::CONNECTION, HeaderValue::from_static("close"));
        }
        response
    }
}
