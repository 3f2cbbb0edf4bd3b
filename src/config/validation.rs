//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, pool sizes > 0)
//! - Validate addresses and the CORS origin before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a loaded configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_host_port(&config.listener.bind_address) {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' must be host:port", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }

    if !is_host_port(&config.cache.address) {
        errors.push(ValidationError::new(
            "cache.address",
            format!("'{}' must be host:port", config.cache.address),
        ));
    }
    if config.cache.pool_size == 0 {
        errors.push(ValidationError::new("cache.pool_size", "must be greater than 0"));
    }
    if config.cache.timeout_ms == 0 {
        errors.push(ValidationError::new("cache.timeout_ms", "must be greater than 0"));
    }

    if config.shutdown.drain_timeout_secs == 0 {
        errors.push(ValidationError::new("shutdown.drain_timeout_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let origin = &config.cors.allowed_origin;
    let origin_ok = HeaderValue::from_str(origin).is_ok()
        && url::Url::parse(origin)
            .map(|u| u.has_host() && matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
    if !origin_ok {
        errors.push(ValidationError::new(
            "cors.allowed_origin",
            format!("'{}' is not an http(s) origin", origin),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_host_port(address: &str) -> bool {
    match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.cache.address = "localhost".into();
        config.cache.pool_size = 0;
        config.shutdown.drain_timeout_secs = 0;
        config.cors.allowed_origin = "*".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "cache.address",
                "cache.pool_size",
                "shutdown.drain_timeout_secs",
                "cors.allowed_origin",
            ]
        );
    }

    #[test]
    fn bind_address_accepts_hostnames() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "localhost:8080".into();
        assert!(validate_config(&config).is_ok());

        config.listener.bind_address = "localhost".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "listener.bind_address");
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }

    #[test]
    fn host_port_accepts_hostnames() {
        assert!(is_host_port("redis:6379"));
        assert!(is_host_port("10.0.0.3:6380"));
        assert!(!is_host_port(":6379"));
        assert!(!is_host_port("redis:port"));
    }
}
