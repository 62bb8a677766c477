//! Upstream HTTP transport.
//!
//! # Responsibilities
//! - Define the client seam the driver fetches real responses through
//! - Provide the default reqwest-backed implementation
//!
//! # Design Decisions
//! - The trait takes a prepared [`UpstreamCall`]; header policy (which
//!   inbound headers survive) is decided by the caller, not here
//! - Transport failures surface as errors; mapping them to a degraded
//!   response is the driver's concern

use async_trait::async_trait;
use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use thiserror::Error;

use crate::exchange::response::CanonicalResponse;

/// A fully-prepared outgoing request.
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    /// HTTP method, forwarded verbatim.
    pub method: Method,

    /// Absolute upstream URL.
    pub url: String,

    /// Headers to send, already filtered by the caller.
    pub headers: HeaderMap,

    /// Body bytes, if any.
    pub body: Option<Bytes>,
}

/// Error reaching or reading from the upstream.
#[derive(Debug, Error)]
pub enum UpstreamTransportError {
    /// Failure raised by the default reqwest transport.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Failure raised by a custom [`UpstreamClient`] implementation.
    #[error("{0}")]
    Client(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Transport used to fetch real upstream responses.
///
/// Swapped out in tests to observe calls or inject failures without a
/// network listener.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Execute the call and normalize the result.
    async fn request(&self, call: UpstreamCall) -> Result<CanonicalResponse, UpstreamTransportError>;
}

/// Default client backed by reqwest (http and https upstreams).
pub struct HttpUpstreamClient {
    client: reqwest::Client,
}

impl HttpUpstreamClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpUpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn request(&self, call: UpstreamCall) -> Result<CanonicalResponse, UpstreamTransportError> {
        let mut request = self
            .client
            .request(call.method, call.url.as_str())
            .headers(call.headers);
        if let Some(body) = call.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(CanonicalResponse::from_parts(status, headers, body))
    }
}
