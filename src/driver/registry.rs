//! Driver claim registry.
//!
//! # Design Decisions
//! - One driver per server instance; a second attach is an error the
//!   harness must handle, not a silent replacement
//! - The registry is injected, never process-global, so suites running
//!   in parallel with separate registries cannot interfere

use dashmap::DashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Identity of one server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Returned when a server instance already has a driver attached.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("server instance {instance} already has a driver attached")]
pub struct DuplicateDriverError {
    /// The contested instance.
    pub instance: InstanceId,
}

/// Tracks which server instances currently have a driver attached.
///
/// Cheap to clone; clones share the same claim set.
#[derive(Debug, Clone, Default)]
pub struct DriverRegistry {
    claims: Arc<DashSet<InstanceId>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an instance for a new driver.
    pub(crate) fn claim(&self, instance: InstanceId) -> Result<(), DuplicateDriverError> {
        if self.claims.insert(instance) {
            tracing::debug!(instance = %instance, "Driver claim registered");
            Ok(())
        } else {
            Err(DuplicateDriverError { instance })
        }
    }

    /// Release a claim. Releasing an unclaimed instance is a no-op, so
    /// teardown stays idempotent.
    pub(crate) fn release(&self, instance: InstanceId) {
        if self.claims.remove(&instance).is_some() {
            tracing::debug!(instance = %instance, "Driver claim released");
        }
    }

    /// Whether an instance currently has a driver attached.
    pub fn is_claimed(&self, instance: InstanceId) -> bool {
        self.claims.contains(&instance)
    }
}
