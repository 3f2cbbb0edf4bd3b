//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (route lookup)
//!     → admission (counted, or 503 once draining)
//!     → handler
//!
//! No match:
//!     → fallback (404 JSON, not counted)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route

pub mod router;

pub use router::api_routes;
