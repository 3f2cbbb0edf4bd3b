//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{GatewayConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => write!(f, "Invalid value for {}: '{}'", var, value),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn read_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Overlay environment variables onto `config`.
///
/// `GO_SERVICE_PORT` and `DJANGO_SERVICE_URL` win over their aliases
/// `BIND_ADDRESS` and `CORS_ALLOWED_ORIGIN`.
///
/// `lookup` resolves a variable name to its value; production passes
/// `std::env::var`, tests pass a map.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(addr) = lookup("REDIS_ADDR") {
        config.cache.address = addr;
    }
    if let Some(password) = lookup("REDIS_PASSWORD") {
        config.cache.password = password;
    }
    if let Some(db) = lookup("REDIS_DB") {
        config.cache.database = parse_env("REDIS_DB", db)?;
    }
    if let Some(bind) = lookup("GO_SERVICE_PORT").or_else(|| lookup("BIND_ADDRESS")) {
        config.listener.bind_address = normalize_bind_address(&bind);
    }
    if let Some(origin) = lookup("DJANGO_SERVICE_URL").or_else(|| lookup("CORS_ALLOWED_ORIGIN")) {
        config.cors.allowed_origin = origin;
    }
    if let Some(secs) = lookup("DRAIN_TIMEOUT_SECS") {
        config.shutdown.drain_timeout_secs = parse_env("DRAIN_TIMEOUT_SECS", secs)?;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        config.observability.log_format = match format.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => return Err(ConfigError::Env { var: "LOG_FORMAT", value: format }),
        };
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env { var, value })
}

/// Accept the port-only `:8080` form and bind it on all interfaces.
fn normalize_bind_address(raw: &str) -> String {
    if raw.starts_with(':') {
        format!("0.0.0.0{}", raw)
    } else {
        raw.to_string()
    }
}
