//! Single-resolution handshake plumbing.
//!
//! # Design Decisions
//! - A resolution handle is consumed on use; the type system enforces
//!   at most one resolution per request
//! - Dropping the handle without resolving is observable on the waiting
//!   side as `None`, which the driver degrades to a 500
//! - Resolving after the waiting side has gone away is a no-op

use std::sync::Arc;
use tokio::sync::oneshot;

use crate::exchange::request::CanonicalRequest;
use crate::exchange::response::{CanonicalResponse, ResolvedResponse};

/// The outcome of one interception handshake.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The response chosen for the caller.
    pub response: ResolvedResponse,

    /// Tag naming which interceptor resolved the request.
    pub interceptor: String,
}

/// Write side of the handshake. Consumed by resolving.
pub struct ResolutionHandle {
    tx: oneshot::Sender<Resolution>,
}

impl ResolutionHandle {
    /// Deliver the resolution to the waiting handshake.
    pub fn resolve(self, resolution: Resolution) {
        if self.tx.send(resolution).is_err() {
            tracing::debug!("Handshake abandoned before the resolution was delivered");
        }
    }

    /// Resolve with a handler-fabricated response.
    pub fn resolve_synthetic(self, response: CanonicalResponse, interceptor: impl Into<String>) {
        self.resolve(Resolution {
            response: ResolvedResponse::Synthetic(response),
            interceptor: interceptor.into(),
        });
    }

    /// Resolve with a response fetched from the real upstream.
    pub fn resolve_real(self, response: CanonicalResponse, interceptor: impl Into<String>) {
        self.resolve(Resolution {
            response: ResolvedResponse::Real(response),
            interceptor: interceptor.into(),
        });
    }
}

impl std::fmt::Debug for ResolutionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionHandle").finish_non_exhaustive()
    }
}

/// Read side of the handshake, held by the driver.
pub(crate) struct PendingResolution {
    rx: oneshot::Receiver<Resolution>,
}

impl PendingResolution {
    /// Wait for the handler to resolve. `None` means the handle was
    /// dropped without resolving.
    pub(crate) async fn wait(self) -> Option<Resolution> {
        self.rx.await.ok()
    }
}

/// Create a linked handle/pending pair for one request.
pub(crate) fn pending() -> (ResolutionHandle, PendingResolution) {
    let (tx, rx) = oneshot::channel();
    (ResolutionHandle { tx }, PendingResolution { rx })
}

/// A completed exchange as delivered to response observers.
///
/// Exactly one of these is produced per intercepted request, after the
/// resolution and before the response is written to the caller.
#[derive(Debug, Clone)]
pub struct InterceptedExchange {
    /// The request that was intercepted.
    pub request: Arc<CanonicalRequest>,

    /// The response chosen for it, tagged with provenance.
    pub response: ResolvedResponse,

    /// Tag of the interceptor that resolved the request.
    pub interceptor: String,
}
