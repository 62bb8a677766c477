//! Upstream transport subsystem.
//!
//! The driver never speaks HTTP to the real service directly; it goes
//! through the [`client::UpstreamClient`] seam so tests can substitute
//! a fake transport.

pub mod client;

pub use client::{HttpUpstreamClient, UpstreamCall, UpstreamClient, UpstreamTransportError};
