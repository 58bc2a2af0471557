//! Offload driver SPI
//!
//! Every transport backend that wants to be selectable through the
//! registry implements `OffloadDriver`. The connections it creates
//! implement `Connection` and belong to the caller from then on.

use async_trait::async_trait;

use crate::engine::error::EngineResult;
use crate::engine::types::{ConnLock, ConnectionId};

/// Capability interface implemented by each offload backend
///
/// Name and priority are not part of the trait: they are supplied at
/// registration time, so one implementation can be registered under
/// several names.
pub trait OffloadDriver: Send + Sync {
    /// Reports the driver's maximum data segment length in bytes.
    ///
    /// Errors are forwarded to the caller of `DriverRegistry::limits`
    /// unchanged.
    fn limits(&self) -> EngineResult<usize>;

    /// Creates a new connection.
    ///
    /// `lock` is owned by the caller and must be stored, not acquired,
    /// here. Returns `None` when the driver cannot allocate a connection.
    fn new_conn(&self, name: &str, lock: ConnLock) -> Option<Box<dyn Connection>>;
}

/// Connection handle produced by an offload driver
#[async_trait]
pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    /// Name given by the connection owner
    fn name(&self) -> &str;

    /// Name of the offload backend that created this connection
    fn offload(&self) -> &str;

    fn is_closed(&self) -> bool;

    /// Closes the connection under its exclusion lock.
    ///
    /// Closing twice is a no-op.
    async fn close(&self) -> EngineResult<()>;
}
