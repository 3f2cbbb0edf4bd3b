//! Admission Middleware.
//! Registers each request with the shutdown coordinator.
//!
//! A request is counted from admission until its response body has been
//! fully written or dropped. Requests arriving after draining started get
//! 503 without reaching a handler.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http_body::{Frame, SizeHint};

use crate::http::response::ApiError;
use crate::lifecycle::shutdown::{InFlightGuard, ShutdownCoordinator};
use crate::observability::metrics;

pub async fn admission_middleware(
    State(coordinator): State<ShutdownCoordinator>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let start = Instant::now();

    let Some(guard) = coordinator.try_admit() else {
        tracing::debug!(path = %request.uri().path(), "Rejecting request, shutting down");
        let response = ApiError::ShuttingDown.into_response();
        metrics::record_request(&method, response.status().as_u16(), start);
        return response;
    };

    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);

    response.map(|body| {
        Body::new(InFlightBody {
            inner: body,
            _guard: guard,
        })
    })
}

/// Response body that keeps its request counted until it is dropped.
struct InFlightBody {
    inner: Body,
    _guard: InFlightGuard,
}

impl http_body::Body for InFlightBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        http_body::Body::poll_frame(Pin::new(&mut self.inner), cx)
    }

    fn is_end_stream(&self) -> bool {
        http_body::Body::is_end_stream(&self.inner)
    }

    fn size_hint(&self) -> SizeHint {
        http_body::Body::size_hint(&self.inner)
    }
}
