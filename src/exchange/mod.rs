//! Canonical exchange model.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → request.rs (buffer body, normalize, build envelope)
//!     → handler observes InterceptedRequest
//!     → resolution.rs (single-use handle delivers the chosen response)
//!     → response.rs (canonical response, tagged with provenance)
//!     → InterceptedExchange delivered to response observers
//! ```
//!
//! # Design Decisions
//! - One canonical shape for requests and responses, independent of the
//!   serving framework and the upstream transport
//! - Single-use capabilities (fetch, resolve) are enforced by move
//!   semantics rather than runtime checks

pub mod request;
pub mod resolution;
pub mod response;

pub use request::{BodyPayload, CanonicalRequest, ExtractError, InterceptedRequest, UpstreamFetch};
pub use resolution::{InterceptedExchange, Resolution, ResolutionHandle};
pub use response::{CanonicalResponse, ResolvedResponse};
