//! HTTP interception proxy library for test harnesses and dev-time
//! mocking.
//!
//! A driver sits between a test suite and a real HTTP service: each
//! inbound request is held open while an observer decides to fabricate
//! a response or pass through to the upstream, and every completed
//! exchange is reported before its response is sent.

pub mod config;
pub mod driver;
pub mod exchange;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use driver::{DriverRegistry, InterceptDriver, RequestObserver, ResponseObserver, Teardown};
pub use exchange::{
    CanonicalRequest, CanonicalResponse, InterceptedExchange, InterceptedRequest, ResolvedResponse,
};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
