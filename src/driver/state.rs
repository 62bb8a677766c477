//! Shared driver state injected into the handshake handler.

use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::driver::observer::{
    NoopRequestObserver, NoopResponseObserver, RequestObserver, ResponseObserver,
};
use crate::driver::registry::{DriverRegistry, InstanceId};
use crate::routing::table::RouteTable;
use crate::upstream::client::UpstreamClient;

/// State shared between a driver facade and its handshake handlers.
///
/// Observer slots are hot-swappable so a harness can install and remove
/// handlers while requests are in flight; a handshake that already
/// loaded an observer keeps using it to completion.
pub(crate) struct DriverShared {
    instance: InstanceId,
    registry: DriverRegistry,
    routes: RouteTable,
    client: Arc<dyn UpstreamClient>,
    active: AtomicBool,
    torn_down: AtomicBool,
    request_observer: ArcSwap<Box<dyn RequestObserver>>,
    response_observer: ArcSwap<Box<dyn ResponseObserver>>,
}

impl DriverShared {
    pub(crate) fn new(
        instance: InstanceId,
        registry: DriverRegistry,
        routes: RouteTable,
        client: Arc<dyn UpstreamClient>,
    ) -> Self {
        Self {
            instance,
            registry,
            routes,
            client,
            // Drivers intercept from the moment they attach.
            active: AtomicBool::new(true),
            torn_down: AtomicBool::new(false),
            request_observer: ArcSwap::from_pointee(
                Box::new(NoopRequestObserver) as Box<dyn RequestObserver>
            ),
            response_observer: ArcSwap::from_pointee(
                Box::new(NoopResponseObserver) as Box<dyn ResponseObserver>
            ),
        }
    }

    pub(crate) fn instance(&self) -> InstanceId {
        self.instance
    }

    pub(crate) fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub(crate) fn client(&self) -> Arc<dyn UpstreamClient> {
        self.client.clone()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    pub(crate) fn request_observer(&self) -> Arc<Box<dyn RequestObserver>> {
        self.request_observer.load_full()
    }

    pub(crate) fn set_request_observer(&self, observer: Box<dyn RequestObserver>) {
        self.request_observer.store(Arc::new(observer));
    }

    pub(crate) fn response_observer(&self) -> Arc<Box<dyn ResponseObserver>> {
        self.response_observer.load_full()
    }

    pub(crate) fn set_response_observer(&self, observer: Box<dyn ResponseObserver>) {
        self.response_observer.store(Arc::new(observer));
    }

    /// Mark this driver torn down. Returns true exactly once, so a
    /// repeated teardown (or a second teardown for the same driver)
    /// cannot release a claim a later driver now holds.
    pub(crate) fn begin_teardown(&self) -> bool {
        !self.torn_down.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn release_claim(&self) {
        self.registry.release(self.instance);
    }
}
