//! Observer capabilities installed on a driver.
//!
//! # Responsibilities
//! - Define the request-observer and response-observer seams
//! - Provide the no-op defaults every driver starts with
//! - Adapt plain async closures to the observer traits
//!
//! # Design Decisions
//! - Observers are infallible from the driver's point of view: errors
//!   are logged and swallowed, never surfaced to the proxied caller
//! - The no-op request observer drops its envelope, which the driver
//!   degrades to a 500; an unconfigured driver fails fast instead of
//!   hanging callers

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::future::Future;

use crate::exchange::request::InterceptedRequest;
use crate::exchange::resolution::InterceptedExchange;

/// Error type observers may return. Logged by the driver, never
/// forwarded to the caller.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Observes every intercepted request and decides how it resolves.
#[async_trait]
pub trait RequestObserver: Send + Sync {
    /// Called once per intercepted request, concurrently with the
    /// waiting handshake. The envelope carries the single-use resolution
    /// handle; dropping it unresolved degrades the request to a 500.
    async fn on_request(&self, intercepted: InterceptedRequest) -> Result<(), ObserverError>;
}

/// Observes every completed exchange before the response is sent.
#[async_trait]
pub trait ResponseObserver: Send + Sync {
    /// Called once per exchange, after resolution and before the
    /// response reaches the caller.
    async fn on_response(&self, exchange: InterceptedExchange) -> Result<(), ObserverError>;
}

/// Default request observer: observes nothing and resolves nothing.
pub struct NoopRequestObserver;

#[async_trait]
impl RequestObserver for NoopRequestObserver {
    async fn on_request(&self, _intercepted: InterceptedRequest) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// Default response observer: acknowledges every exchange.
pub struct NoopResponseObserver;

#[async_trait]
impl ResponseObserver for NoopResponseObserver {
    async fn on_response(&self, _exchange: InterceptedExchange) -> Result<(), ObserverError> {
        Ok(())
    }
}

type BoxedRequestFn =
    Box<dyn Fn(InterceptedRequest) -> BoxFuture<'static, Result<(), ObserverError>> + Send + Sync>;

/// Adapts an async closure to [`RequestObserver`].
pub(crate) struct FnRequestObserver {
    f: BoxedRequestFn,
}

impl FnRequestObserver {
    pub(crate) fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(InterceptedRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ObserverError>> + Send + 'static,
    {
        Self {
            f: Box::new(move |intercepted| Box::pin(f(intercepted))),
        }
    }
}

#[async_trait]
impl RequestObserver for FnRequestObserver {
    async fn on_request(&self, intercepted: InterceptedRequest) -> Result<(), ObserverError> {
        (self.f)(intercepted).await
    }
}

type BoxedResponseFn =
    Box<dyn Fn(InterceptedExchange) -> BoxFuture<'static, Result<(), ObserverError>> + Send + Sync>;

/// Adapts an async closure to [`ResponseObserver`].
pub(crate) struct FnResponseObserver {
    f: BoxedResponseFn,
}

impl FnResponseObserver {
    pub(crate) fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(InterceptedExchange) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ObserverError>> + Send + 'static,
    {
        Self {
            f: Box::new(move |exchange| Box::pin(f(exchange))),
        }
    }
}

#[async_trait]
impl ResponseObserver for FnResponseObserver {
    async fn on_response(&self, exchange: InterceptedExchange) -> Result<(), ObserverError> {
        (self.f)(exchange).await
    }
}
