//! OS signal handling.
//!
//! # Responsibilities
//! - Register the interrupt handler
//! - Translate signals to the internal shutdown event
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Signals only trigger the coordinator; draining is the serving
//!   loop's job

use crate::lifecycle::shutdown::Shutdown;

/// Wait for Ctrl+C and trigger the shutdown coordinator.
///
/// Meant to be spawned alongside the serving loop.
pub async fn wait_for_ctrl_c(shutdown: Shutdown) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
