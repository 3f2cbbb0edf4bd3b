//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, panics, CORS, timeout, limits)
//! - Serve on the bounded listener with HTTP/1.1 and HTTP/2
//! - Stop accepting and drain when the shutdown future resolves
//!
//! # Middleware Order
//! ```text
//! outermost → SetRequestId → PropagateRequestId → Trace → CatchPanic
//!           → CORS → Timeout (408) → Body limit (413) → routes → admission
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::cache::CacheBackend;
use crate::config::GatewayConfig;
use crate::http::request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
use crate::http::response::ApiError;
use crate::lifecycle::shutdown::{DrainOutcome, ShutdownCoordinator};
use crate::net::connection::ConnectionId;
use crate::net::listener::Listener;
use crate::routing;
use crate::security::{cors, limits};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheBackend,
    pub coordinator: ShutdownCoordinator,
    /// Simulated work in `process-data`.
    pub compute_delay: Duration,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    coordinator: ShutdownCoordinator,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &GatewayConfig, cache: CacheBackend, coordinator: ShutdownCoordinator) -> Self {
        let state = AppState {
            cache,
            coordinator: coordinator.clone(),
            compute_delay: Duration::from_millis(config.compute.delay_ms),
        };

        Self {
            router: Self::build_router(config, state),
            coordinator,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        routing::api_routes(state)
            .layer(DefaultBodyLimit::disable())
            .layer(limits::body_limit(&config.security))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors::cors_layer(&config.cors))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` resolves, then drain.
    ///
    /// Returns once the coordinator reaches `Stopped`. After a clean drain,
    /// open connections get whatever is left of the drain deadline to flush
    /// and close.
    pub async fn run<F>(self, listener: Listener, shutdown: F) -> DrainOutcome
    where
        F: Future<Output = ()> + Send,
    {
        let token = self.coordinator.accept_token();
        tracing::info!(
            address = ?listener.local_addr().ok(),
            "HTTP server starting"
        );

        let mut accept_loop = tokio::spawn(listener.serve(self.router, token.clone()));

        tokio::select! {
            _ = shutdown => {}
            _ = token.cancelled() => {}
        }

        let started = Instant::now();
        let outcome = self.coordinator.drain().await;

        if outcome == DrainOutcome::Clean {
            let remaining = self
                .coordinator
                .drain_timeout()
                .saturating_sub(started.elapsed());
            if tokio::time::timeout(remaining, &mut accept_loop).await.is_err() {
                tracing::debug!("Connections still open at deadline, closing");
            }
        }
        accept_loop.abort();

        tracing::info!(outcome = ?outcome, "HTTP server stopped");
        outcome
    }
}

fn request_span(request: &Request<Body>) -> Span {
    let connection_id = request
        .extensions()
        .get::<ConnectionId>()
        .map(ToString::to_string)
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = request.request_id().unwrap_or(""),
        connection_id = %connection_id,
    )
}

fn handle_panic(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = detail, "Handler panicked");
    ApiError::Internal.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::cache::MemoryStore;

    fn server() -> HttpServer {
        HttpServer::new(
            &GatewayConfig::default(),
            MemoryStore::new().into(),
            ShutdownCoordinator::new(Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn assigns_request_id() {
        let response = server()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(&X_REQUEST_ID));
    }

    #[tokio::test]
    async fn keeps_client_request_id() {
        let request = Request::get("/health")
            .header(&X_REQUEST_ID, "client-id-1")
            .body(Body::empty())
            .unwrap();
        let response = server().router().oneshot(request).await.unwrap();

        assert_eq!(response.headers()[&X_REQUEST_ID], "client-id-1");
    }

    #[test]
    fn panic_maps_to_internal_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
