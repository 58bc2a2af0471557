//! Shared types for the offload registry
//!
//! Identifiers and descriptors handed between drivers, the registry and
//! connection owners.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exclusion lock owned by the connection owner.
///
/// The registry only hands it through to the driver factory; the created
/// connection is the one that takes it.
pub type ConnLock = Arc<tokio::sync::Mutex<()>>;

/// Unique identifier for a connection produced by a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only snapshot of a registered driver, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub name: String,
    pub priority: i32,
    pub registered_at: DateTime<Utc>,
}

/// Creates a fresh exclusion lock for a new connection
pub fn new_conn_lock() -> ConnLock {
    Arc::new(tokio::sync::Mutex::new(()))
}
