//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Trigger (signal or harness) → Stop accepting → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Shutdown is a broadcast: the serving loop and any harness-owned
//!   tasks all observe the same trigger
//! - Embedded use (test suites) triggers programmatically; the binary
//!   wires the signal handler on top

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
