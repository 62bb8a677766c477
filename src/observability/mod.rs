//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, test runner capture)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every handshake event (route, interceptor,
//!   provenance, status)
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
