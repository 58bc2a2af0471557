//! Software offload driver
//!
//! The fallback backend that is always available. It registers with the
//! lowest default priority so any hardware offload that shows up wins
//! auto-selection, and it performs no I/O of its own here: connections it
//! hands out only carry identity and the owner's exclusion lock.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::engine::error::EngineResult;
use crate::engine::traits::{Connection, OffloadDriver};
use crate::engine::types::{ConnLock, ConnectionId};

pub const SOFT_DRIVER_NAME: &str = "soft";
pub const SOFT_DRIVER_PRIORITY: i32 = 0;

/// Largest data segment the software path accepts, in bytes
pub const SOFT_MAX_DATA_SEGMENT_LENGTH: usize = 128 * 1024;

pub struct SoftConnection {
    id: ConnectionId,
    name: String,
    lock: ConnLock,
    closed: AtomicBool,
}

#[async_trait]
impl Connection for SoftConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn offload(&self) -> &str {
        SOFT_DRIVER_NAME
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn close(&self) -> EngineResult<()> {
        let _guard = self.lock.lock().await;
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(connection = %self.id, name = %self.name, "connection closed");
        }
        Ok(())
    }
}

/// Software offload driver implementation
pub struct SoftDriver;

impl SoftDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SoftDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl OffloadDriver for SoftDriver {
    fn limits(&self) -> EngineResult<usize> {
        Ok(SOFT_MAX_DATA_SEGMENT_LENGTH)
    }

    fn new_conn(&self, name: &str, lock: ConnLock) -> Option<Box<dyn Connection>> {
        let conn = SoftConnection {
            id: ConnectionId::new(),
            name: name.to_string(),
            lock,
            closed: AtomicBool::new(false),
        };
        debug!(connection = %conn.id, name = %name, "connection created");
        Some(Box::new(conn))
    }
}
