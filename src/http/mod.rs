//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → driver's catch-all router (interception handshake)
//!     → status + body sent to client
//! ```

pub mod server;

pub use server::HttpServer;
