//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order (metrics, cache, coordinator)
//! - Probe the cache backend once
//! - Bind the listener and hand everything to the HTTP server
//!
//! # Design Decisions
//! - Fail fast on anything that prevents serving (pool creation, bind)
//! - An unreachable backend is only a warning; lookups report it per request
//! - Listeners start last (traffic only when ready)

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::cache::{CacheBackend, CacheError};
use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::{DrainOutcome, ShutdownCoordinator};
use crate::net::listener::{Listener, ListenerError};
use crate::observability::metrics;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cache backend: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// A fully initialized gateway, bound and ready to serve.
pub struct Gateway {
    server: HttpServer,
    listener: Listener,
    coordinator: ShutdownCoordinator,
}

impl Gateway {
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    pub fn coordinator(&self) -> &ShutdownCoordinator {
        &self.coordinator
    }

    /// Serve until `shutdown` resolves, then drain.
    pub async fn run<F>(self, shutdown: F) -> DrainOutcome
    where
        F: Future<Output = ()> + Send,
    {
        self.server.run(self.listener, shutdown).await
    }
}

/// Bring the gateway up from validated configuration.
pub async fn start(config: GatewayConfig) -> Result<Gateway, StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let cache = CacheBackend::from_config(&config.cache)?;
    match cache.ping().await {
        Ok(()) => tracing::info!(
            backend = cache.kind(),
            address = %config.cache.address,
            "Cache backend reachable"
        ),
        Err(e) => tracing::warn!(
            backend = cache.kind(),
            address = %config.cache.address,
            error = %e,
            "Cache backend unreachable, continuing"
        ),
    }

    let coordinator =
        ShutdownCoordinator::new(Duration::from_secs(config.shutdown.drain_timeout_secs));

    let listener = Listener::bind(&config.listener).await?;
    let server = HttpServer::new(&config, cache, coordinator.clone());

    Ok(Gateway {
        server,
        listener,
        coordinator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;
    use crate::lifecycle::shutdown::LifecycleState;

    fn memory_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();
        config.cache.backend = BackendKind::Memory;
        config
    }

    #[tokio::test]
    async fn starts_and_stops_cleanly() {
        let gateway = start(memory_config()).await.unwrap();
        assert!(gateway.local_addr().unwrap().port() > 0);
        assert_eq!(gateway.coordinator().state(), LifecycleState::Running);

        let outcome = gateway.run(async {}).await;
        assert_eq!(outcome, DrainOutcome::Clean);
    }

    #[tokio::test]
    async fn unreachable_redis_is_not_fatal() {
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let closed = probe.local_addr().unwrap();
        drop(probe);

        let mut config = memory_config();
        config.cache.backend = BackendKind::Redis;
        config.cache.address = closed.to_string();
        config.cache.timeout_ms = 200;

        assert!(start(config).await.is_ok());
    }

    #[tokio::test]
    async fn bind_failure_is_fatal() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = memory_config();
        config.listener.bind_address = taken.local_addr().unwrap().to_string();

        assert!(matches!(
            start(config).await,
            Err(StartupError::Listener(ListenerError::Bind(_)))
        ));
    }
}
