//! Cross-origin resource sharing.
//!
//! # Responsibilities
//! - Allow exactly one configured origin, optionally with credentials
//! - Answer preflight requests
//!
//! # Design Decisions
//! - Exact origin match only; wildcards cannot be combined with credentials
//! - Preflight results are cacheable for 12 hours

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Build the CORS layer for `config`.
///
/// An origin that is not a valid header value allows no cross-origin access.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .allow_credentials(config.allow_credentials)
        .max_age(PREFLIGHT_MAX_AGE);

    match HeaderValue::from_str(&config.allowed_origin) {
        Ok(origin) => layer.allow_origin(AllowOrigin::exact(origin)),
        Err(e) => {
            tracing::warn!(
                origin = %config.allowed_origin,
                error = %e,
                "Invalid CORS origin, cross-origin requests will be refused"
            );
            layer
        }
    }
}
