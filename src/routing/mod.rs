//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming path ("/api/users/1?q=x")
//!     → table.rs (exact first-segment lookup)
//!     → Return: ResolvedTarget { key, upstream_url } or None
//!
//! Table construction (at startup):
//!     [routes] config section
//!     → validate keys and upstream URLs
//!     → freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - Exact segment matching only, no prefixes and no regex

pub mod table;

pub use table::{ResolvedTarget, RouteEntry, RouteError, RouteTable};
