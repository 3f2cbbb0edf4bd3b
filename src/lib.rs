//! Cache Gateway Library
//!
//! A read-through cache service with bounded-time graceful shutdown.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────────────┐
//!     ────────────────────┼─▶ net::listener ─▶ http::server ─▶ routing      │
//!                         │                     (middleware)    │            │
//!                         │                                     ▼            │
//!                         │                         http::middleware         │
//!                         │                         (admission, in-flight)   │
//!                         │                                     │            │
//!     Client Response     │                                     ▼            │
//!     ◀───────────────────┼──────────────────────── http::handlers ─▶ cache ─┼──▶ Redis
//!                         │                                                  │
//!                         │   lifecycle: startup, signals, shutdown          │
//!                         │   config · observability · security              │
//!                         └──────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;

pub use cache::{CacheBackend, LookupKey, LookupOutcome, MemoryStore, RedisStore};
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::{DrainOutcome, LifecycleState, ShutdownCoordinator};
