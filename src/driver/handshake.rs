//! The per-request interception handshake.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → route lookup (miss → 404, driver inactive → 500)
//!     → extract canonical request + build envelope
//!     → request observer runs concurrently (fire and forget)
//!     → handshake waits for the single resolution
//!     → response observer runs to completion (errors swallowed)
//!     → status + body written to the caller
//! ```
//!
//! # Design Decisions
//! - The handshake never races ahead of the response observer: the
//!   observer finishes before the caller sees anything
//! - Only status and body are forwarded to the caller; see the note at
//!   the write site about response headers
//! - Every failure mode degrades to a definite response, so callers
//!   never hang on an abandoned handshake

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use std::sync::Arc;

use crate::driver::state::DriverShared;
use crate::exchange::request::extract;
use crate::exchange::resolution::InterceptedExchange;
use crate::observability::metrics;

/// Axum handler for every intercepted route.
pub(crate) async fn intercept(
    State(shared): State<Arc<DriverShared>>,
    request: Request<Body>,
) -> Response {
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let (route, upstream_url) = match shared.routes().resolve(&path_and_query) {
        Some(target) => (target.key.to_string(), target.upstream_url),
        None => {
            tracing::debug!(url = %path_and_query, "No route matched");
            metrics::record_unrouted();
            return fixed_response(StatusCode::NOT_FOUND, "No matching route found");
        }
    };

    tracing::debug!(
        route = %route,
        url = %path_and_query,
        upstream = %upstream_url,
        "Entering interception handshake"
    );

    if !shared.is_active() {
        metrics::record_handshake(&route, StatusCode::INTERNAL_SERVER_ERROR, "inactive");
        return fixed_response(StatusCode::INTERNAL_SERVER_ERROR, "driver not active");
    }

    let (intercepted, pending) = match extract(request, upstream_url, shared.client()).await {
        Ok(parts) => parts,
        Err(error) => {
            tracing::warn!(route = %route, error = %error, "Failed to extract inbound request");
            metrics::record_handshake(&route, StatusCode::BAD_REQUEST, "extract_failed");
            return fixed_response(StatusCode::BAD_REQUEST, "failed to read request body");
        }
    };
    let canonical = intercepted.request.clone();

    // The request observer runs concurrently with the waiting handshake;
    // it resolves the envelope whenever it is ready.
    let observer = shared.request_observer();
    tokio::spawn(async move {
        if let Err(error) = observer.on_request(intercepted).await {
            tracing::warn!(error = %error, "Request observer failed");
        }
    });

    let Some(resolution) = pending.wait().await else {
        tracing::error!(route = %route, "Request observer dropped the resolution handle");
        metrics::record_handshake(&route, StatusCode::INTERNAL_SERVER_ERROR, "unresolved");
        return fixed_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "request handler dropped the resolution handle",
        );
    };

    let provenance = resolution.response.provenance();
    let chosen = resolution.response.response();
    let status = chosen.status;
    let body = chosen.body.clone();

    tracing::debug!(
        route = %route,
        interceptor = %resolution.interceptor,
        provenance,
        status = %status,
        "Handshake resolved"
    );

    // Observe the exchange to completion before anything reaches the
    // caller. Observer errors and panics are logged and swallowed.
    let observer = shared.response_observer();
    let exchange = InterceptedExchange {
        request: canonical,
        response: resolution.response,
        interceptor: resolution.interceptor,
    };
    match tokio::spawn(async move { observer.on_response(exchange).await }).await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            tracing::warn!(route = %route, error = %error, "Response observer failed")
        }
        Err(error) => {
            tracing::warn!(route = %route, error = %error, "Response observer panicked")
        }
    }

    metrics::record_handshake(&route, status, provenance);

    // Status and body only. The chosen response's headers describe a
    // body that was already decoded on the way in; replaying them would
    // corrupt the payload for the caller.
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
}

fn fixed_response(status: StatusCode, body: &'static str) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
}
