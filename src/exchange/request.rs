//! Inbound request extraction and the intercepted-request envelope.
//!
//! # Responsibilities
//! - Buffer the inbound body and normalize the request into canonical form
//! - Package the request with its single-use upstream fetch and its
//!   single-use resolution handle
//!
//! # Design Decisions
//! - Bodies are buffered fully; handlers inspect values, not streams
//! - JSON bodies are parsed once here so every handler sees the same value
//! - The upstream fetch and the resolution handle are consumed on use,
//!   so one request cannot hit the upstream twice or resolve twice

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

use crate::exchange::resolution::{self, PendingResolution, ResolutionHandle};
use crate::exchange::response::CanonicalResponse;
use crate::upstream::client::{UpstreamCall, UpstreamClient};

/// Headers that identify the original hop. Forwarding them would point
/// the upstream at the wrong origin.
const DROPPED_HOP_HEADERS: [&str; 3] = ["host", "origin", "referer"];

/// Framing headers describe the inbound encoding; the transport
/// recomputes them for the body it actually sends.
const DROPPED_FRAMING_HEADERS: [&str; 2] = ["content-length", "transfer-encoding"];

/// An inbound request in canonical form.
#[derive(Debug, Clone)]
pub struct CanonicalRequest {
    /// HTTP method.
    pub method: Method,

    /// Path and query exactly as the caller sent them.
    pub original_url: String,

    /// Absolute URL the request resolves to on the real upstream.
    pub upstream_url: String,

    /// Headers exactly as the caller sent them.
    pub headers: HeaderMap,

    /// Buffered body, if the request carried one.
    pub body: Option<BodyPayload>,
}

impl CanonicalRequest {
    /// Case-insensitive single-header lookup, for matching convenience.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A buffered request body.
#[derive(Debug, Clone)]
pub enum BodyPayload {
    /// Raw bytes, kept verbatim.
    Bytes(Bytes),

    /// Body that arrived as `application/json` and parsed cleanly.
    Json(serde_json::Value),
}

impl BodyPayload {
    /// Classify a buffered body. Empty bodies become `None`; JSON is
    /// parsed eagerly when the content type claims it, falling back to
    /// raw bytes when parsing fails.
    pub fn parse(bytes: Bytes, content_type: Option<&str>) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        if content_type.is_some_and(|ct| ct.contains("application/json")) {
            if let Ok(value) = serde_json::from_slice(&bytes) {
                return Some(Self::Json(value));
            }
        }
        Some(Self::Bytes(bytes))
    }

    /// Bytes to put on the wire for an upstream call.
    pub fn to_wire(&self) -> Bytes {
        match self {
            Self::Bytes(bytes) => bytes.clone(),
            Self::Json(value) => Bytes::from(value.to_string()),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Json(_) => None,
        }
    }
}

/// Error normalizing an inbound request.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to buffer request body: {0}")]
    Body(#[source] axum::Error),
}

/// A single-use capability to fetch the real upstream response for one
/// request.
pub struct UpstreamFetch {
    client: Arc<dyn UpstreamClient>,
    request: Arc<CanonicalRequest>,
}

impl UpstreamFetch {
    /// Execute the upstream call this request resolves to.
    ///
    /// Hop-identifying and framing headers are dropped from the outgoing
    /// call; everything else is forwarded verbatim. GET requests never
    /// carry a body upstream. Transport failures degrade to a 500
    /// response carrying the error text, so the handshake always
    /// completes.
    pub async fn fetch(self) -> CanonicalResponse {
        let Self { client, request } = self;

        let mut headers = request.headers.clone();
        for name in DROPPED_HOP_HEADERS.iter().chain(&DROPPED_FRAMING_HEADERS) {
            headers.remove(*name);
        }

        let body = if request.method == Method::GET {
            None
        } else {
            request.body.as_ref().map(|payload| payload.to_wire())
        };

        tracing::debug!(
            method = %request.method,
            url = %request.upstream_url,
            "Fetching real upstream response"
        );

        let call = UpstreamCall {
            method: request.method.clone(),
            url: request.upstream_url.clone(),
            headers,
            body,
        };

        match client.request(call).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(
                    url = %request.upstream_url,
                    error = %error,
                    "Upstream call failed"
                );
                CanonicalResponse::upstream_failure(&error)
            }
        }
    }
}

impl std::fmt::Debug for UpstreamFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamFetch")
            .field("url", &self.request.upstream_url)
            .finish_non_exhaustive()
    }
}

/// The envelope delivered to request observers.
///
/// Carries the canonical request together with the two single-use
/// capabilities for this exchange. Handlers either call [`respond`] or
/// [`pass_through`], or destructure the envelope for custom flows.
///
/// [`respond`]: InterceptedRequest::respond
/// [`pass_through`]: InterceptedRequest::pass_through
#[derive(Debug)]
pub struct InterceptedRequest {
    /// The request, shared with the eventual exchange record.
    pub request: Arc<CanonicalRequest>,

    /// Single-use fetch of the real upstream response.
    pub upstream: UpstreamFetch,

    /// Single-use resolution of the handshake.
    pub handle: ResolutionHandle,
}

impl InterceptedRequest {
    /// Resolve with a synthetic response, never touching the upstream.
    pub fn respond(self, response: CanonicalResponse, interceptor: impl Into<String>) {
        self.handle.resolve_synthetic(response, interceptor);
    }

    /// Fetch the real upstream response and resolve with it.
    pub async fn pass_through(self, interceptor: impl Into<String>) {
        let Self {
            request: _,
            upstream,
            handle,
        } = self;
        let response = upstream.fetch().await;
        handle.resolve_real(response, interceptor);
    }
}

/// Normalize an inbound request and build its interception envelope.
pub(crate) async fn extract(
    request: Request<Body>,
    upstream_url: String,
    client: Arc<dyn UpstreamClient>,
) -> Result<(InterceptedRequest, PendingResolution), ExtractError> {
    let (parts, body) = request.into_parts();

    let original_url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(ExtractError::Body)?;
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let body = BodyPayload::parse(bytes, content_type);

    let request = Arc::new(CanonicalRequest {
        method: parts.method,
        original_url,
        upstream_url,
        headers: parts.headers,
        body,
    });

    let (handle, pending) = resolution::pending();
    let upstream = UpstreamFetch {
        client,
        request: request.clone(),
    };

    Ok((
        InterceptedRequest {
            request,
            upstream,
            handle,
        },
        pending,
    ))
}
