//! Driver facade: attach, observe, toggle, tear down.
//!
//! # Responsibilities
//! - Claim a server instance and hold the shared driver state
//! - Build the catch-all router that funnels traffic into the handshake
//! - Install observers and hand back idempotent teardowns
//!
//! # Design Decisions
//! - The driver is a facade over `Arc<DriverShared>`; in-flight
//!   handshakes keep the state alive after teardown
//! - Installing a request observer returns the full teardown (deactivate,
//!   release claim, reset observer); installing a response observer
//!   returns a teardown that only resets that observer

use axum::routing::any;
use axum::Router;
use std::future::Future;
use std::sync::Arc;

use crate::driver::handshake;
use crate::driver::observer::{
    FnRequestObserver, FnResponseObserver, NoopRequestObserver, NoopResponseObserver,
    ObserverError, RequestObserver, ResponseObserver,
};
use crate::driver::registry::{DriverRegistry, DuplicateDriverError, InstanceId};
use crate::driver::state::DriverShared;
use crate::exchange::request::InterceptedRequest;
use crate::exchange::resolution::InterceptedExchange;
use crate::http::server::HttpServer;
use crate::routing::table::RouteTable;
use crate::upstream::client::{HttpUpstreamClient, UpstreamClient};

/// An interception driver bound to one server instance.
///
/// Attaching claims the instance in the given registry; the claim is
/// released by running the teardown returned from [`on_request`].
/// Drivers start active.
///
/// [`on_request`]: InterceptDriver::on_request
pub struct InterceptDriver {
    shared: Arc<DriverShared>,
}

impl std::fmt::Debug for InterceptDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptDriver")
            .field("instance", &self.shared.instance())
            .field("active", &self.shared.is_active())
            .finish_non_exhaustive()
    }
}

impl InterceptDriver {
    /// Attach a driver to a server instance with the default upstream
    /// client.
    pub fn attach(
        server: &HttpServer,
        routes: RouteTable,
        registry: &DriverRegistry,
    ) -> Result<Self, DuplicateDriverError> {
        Self::attach_with_client(server, routes, registry, Arc::new(HttpUpstreamClient::new()))
    }

    /// Attach a driver with a custom upstream transport.
    pub fn attach_with_client(
        server: &HttpServer,
        routes: RouteTable,
        registry: &DriverRegistry,
        client: Arc<dyn UpstreamClient>,
    ) -> Result<Self, DuplicateDriverError> {
        let instance = server.instance_id();
        registry.claim(instance)?;
        tracing::debug!(instance = %instance, routes = routes.len(), "Driver attached");
        let shared = Arc::new(DriverShared::new(instance, registry.clone(), routes, client));
        Ok(Self { shared })
    }

    /// Build the catch-all router for this driver. Every method on every
    /// path funnels into the interception handshake.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/{*path}", any(handshake::intercept))
            .route("/", any(handshake::intercept))
            .with_state(self.shared.clone())
    }

    /// Install the request observer, replacing the current one. Requests
    /// already holding the previous observer finish with it.
    ///
    /// The returned teardown deactivates the driver, releases its
    /// registry claim, and restores the no-op observer.
    pub fn on_request<O>(&self, observer: O) -> Teardown
    where
        O: RequestObserver + 'static,
    {
        self.shared.set_request_observer(Box::new(observer));
        Teardown::new(self.shared.clone(), TeardownKind::Request)
    }

    /// Install an async closure as the request observer.
    pub fn on_request_fn<F, Fut>(&self, f: F) -> Teardown
    where
        F: Fn(InterceptedRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ObserverError>> + Send + 'static,
    {
        self.on_request(FnRequestObserver::new(f))
    }

    /// Install the response observer, replacing the current one.
    ///
    /// The returned teardown restores the no-op response observer and
    /// nothing else.
    pub fn on_response<O>(&self, observer: O) -> Teardown
    where
        O: ResponseObserver + 'static,
    {
        self.shared.set_response_observer(Box::new(observer));
        Teardown::new(self.shared.clone(), TeardownKind::Response)
    }

    /// Install an async closure as the response observer.
    pub fn on_response_fn<F, Fut>(&self, f: F) -> Teardown
    where
        F: Fn(InterceptedExchange) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ObserverError>> + Send + 'static,
    {
        self.on_response(FnResponseObserver::new(f))
    }

    /// Toggle interception. While inactive the driver answers every
    /// routed request with a fixed 500 and invokes no observers.
    pub fn set_interception(&self, active: bool) {
        tracing::debug!(instance = %self.shared.instance(), active, "Interception toggled");
        self.shared.set_active(active);
    }

    pub fn is_active(&self) -> bool {
        self.shared.is_active()
    }

    /// Identity of the server instance this driver claims.
    pub fn instance_id(&self) -> InstanceId {
        self.shared.instance()
    }
}

/// What a teardown resets.
#[derive(Debug, Clone, Copy)]
enum TeardownKind {
    Request,
    Response,
}

/// Idempotent undo for an installed observer.
///
/// Running twice leaves the same end state as running once; the second
/// run finds the work already done.
pub struct Teardown {
    shared: Arc<DriverShared>,
    kind: TeardownKind,
}

impl Teardown {
    fn new(shared: Arc<DriverShared>, kind: TeardownKind) -> Self {
        Self { shared, kind }
    }

    /// Undo the installation this teardown was returned from.
    pub fn run(&self) {
        match self.kind {
            TeardownKind::Request => {
                if !self.shared.begin_teardown() {
                    return;
                }
                tracing::debug!(instance = %self.shared.instance(), "Driver torn down");
                self.shared.set_active(false);
                self.shared.release_claim();
                self.shared.set_request_observer(Box::new(NoopRequestObserver));
            }
            TeardownKind::Response => {
                self.shared.set_response_observer(Box::new(NoopResponseObserver));
            }
        }
    }
}
