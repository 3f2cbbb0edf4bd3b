//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → optional TOML file (--config)
//!     → environment overrides (.env loaded first if present)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackendKind, CacheConfig, ComputeConfig, CorsConfig, GatewayConfig, ListenerConfig,
    LogFormat, ObservabilityConfig, SecurityConfig, ShutdownConfig, TimeoutConfig,
};
