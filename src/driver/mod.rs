//! Interception driver subsystem.
//!
//! # Data Flow
//! ```text
//! attach (intercept.rs):
//!     claim instance in registry → build shared state → driver facade
//!
//! per request (handshake.rs):
//!     route lookup → extract → request observer → wait for resolution
//!     → response observer → write status + body
//!
//! teardown (intercept.rs):
//!     deactivate → release claim → restore no-op observers
//! ```
//!
//! # Design Decisions
//! - One driver per server instance, enforced by the injected registry
//! - Observer slots swap atomically; in-flight requests finish with the
//!   observer they loaded
//! - Active flag is per driver, so parallel suites toggle independently

pub mod intercept;
pub mod observer;
pub mod registry;

mod handshake;
mod state;

pub use intercept::{InterceptDriver, Teardown};
pub use observer::{
    NoopRequestObserver, NoopResponseObserver, ObserverError, RequestObserver, ResponseObserver,
};
pub use registry::{DriverRegistry, DuplicateDriverError, InstanceId};
