//! Request limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size
//!
//! # Design Decisions
//! - Declared lengths over the limit are rejected before the body is read
//! - Return 413 Payload Too Large

use tower_http::limit::RequestBodyLimitLayer;

use crate::config::SecurityConfig;

/// Cap request bodies at `max_body_size` bytes.
pub fn body_limit(config: &SecurityConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(config.max_body_size)
}
