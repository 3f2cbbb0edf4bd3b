//! Per-connection serving.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Drive one HTTP/1.1 or HTTP/2 connection to completion
//! - Register the connection with the graceful-shutdown watcher
//! - Hold the connection permit until the socket closes

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ConnectInfo;
use axum::Router;
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpStream;
use tower::ServiceExt;

use crate::net::listener::ConnectionPermit;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Spawn a task serving `app` on `stream`.
///
/// Requests carry the peer address as [`ConnectInfo`] and the
/// [`ConnectionId`] as extensions.
pub(crate) fn serve(
    builder: &auto::Builder<TokioExecutor>,
    graceful: &GracefulShutdown,
    stream: TcpStream,
    peer_addr: SocketAddr,
    permit: ConnectionPermit,
    app: Router,
) {
    let id = ConnectionId::new();

    let app = app.map_request(move |mut request: Request<Incoming>| {
        request.extensions_mut().insert(ConnectInfo(peer_addr));
        request.extensions_mut().insert(id);
        request
    });

    let conn = builder
        .serve_connection_with_upgrades(TokioIo::new(stream), TowerToHyperService::new(app))
        .into_owned();
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        tracing::trace!(connection_id = %id, peer_addr = %peer_addr, "Connection opened");
        if let Err(e) = conn.await {
            tracing::debug!(connection_id = %id, error = %e, "Connection error");
        }
        drop(permit);
        tracing::trace!(connection_id = %id, "Connection closed");
    });
}
