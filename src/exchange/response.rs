//! Canonical response representation.
//!
//! # Responsibilities
//! - Normalize synthetic and upstream responses into one shape
//! - Record where a response came from (handler or upstream)
//! - Map upstream transport failures to a plain 500 response
//!
//! # Design Decisions
//! - Bodies are raw bytes; interpretation is left to the consumer
//! - Headers travel with the response for observation, but the driver
//!   never forwards them to the caller

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use std::borrow::Cow;
use std::fmt;

/// A response in canonical form, decoupled from any transport type.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalResponse {
    /// HTTP status code.
    pub status: StatusCode,

    /// Response headers as observed, never replayed to the caller.
    pub headers: HeaderMap,

    /// Response body bytes.
    pub body: Bytes,
}

impl CanonicalResponse {
    /// Create a synthetic response with a status and body and no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Create a response from already-separated parts.
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Attach headers to a response built with [`CanonicalResponse::new`].
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// The degraded response for an upstream transport failure.
    ///
    /// The error text is carried in the body so a test harness can see
    /// what went wrong without parsing logs.
    pub fn upstream_failure(error: &dyn fmt::Display) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("upstream request failed: {error}"),
        )
    }

    /// Body as a string, replacing invalid UTF-8.
    pub fn body_string(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// A response chosen during the handshake, tagged with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedResponse {
    /// Fabricated by a request handler without touching the upstream.
    Synthetic(CanonicalResponse),

    /// Fetched from the real upstream service.
    Real(CanonicalResponse),
}

impl ResolvedResponse {
    /// The underlying response regardless of provenance.
    pub fn response(&self) -> &CanonicalResponse {
        match self {
            Self::Synthetic(response) | Self::Real(response) => response,
        }
    }

    /// Consume the wrapper and return the underlying response.
    pub fn into_inner(self) -> CanonicalResponse {
        match self {
            Self::Synthetic(response) | Self::Real(response) => response,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic(_))
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Self::Real(_))
    }

    /// Provenance label for logs and metrics.
    pub fn provenance(&self) -> &'static str {
        match self {
            Self::Synthetic(_) => "synthetic",
            Self::Real(_) => "real",
        }
    }
}
