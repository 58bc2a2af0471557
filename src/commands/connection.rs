//! Connection commands
//!
//! Connection setup through the registry on behalf of a connection owner.

use std::sync::Arc;

use serde::Serialize;
use tracing::{instrument, warn};

use crate::engine::{ConnLock, Connection, EngineError, EngineResult, OffloadDriver};
use crate::IclState;

/// Response for connection operations
#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub success: bool,
    pub connection_id: Option<String>,
    pub error: Option<String>,
}

/// Creates a connection through the named offload, or the auto-selected one
/// when `offload` is blank
///
/// An unknown offload reports `DriverNotFound` (ENXIO); a driver whose
/// factory produced nothing reports `ConnectionFailed`. The returned
/// connection belongs to the caller, as does `lock`.
#[instrument(skip(state, lock))]
pub fn new_connection(
    state: &IclState,
    offload: Option<&str>,
    name: &str,
    lock: ConnLock,
) -> EngineResult<Box<dyn Connection>> {
    let offload = offload.map(str::trim).filter(|offload| !offload.is_empty());

    let driver: Arc<dyn OffloadDriver> = state.registry.resolve(offload).inspect_err(|e| {
        warn!(error = %e, code = e.code(), "offload not available");
    })?;

    driver.new_conn(name, lock).ok_or_else(|| {
        let err = EngineError::connection_failed(offload.unwrap_or("auto-selected"));
        warn!(error = %err, "connection not created");
        err
    })
}

/// Closes a connection previously returned by `new_connection`
#[instrument(skip(conn), fields(connection_id = %conn.id(), name = %conn.name()))]
pub async fn close_connection(conn: &dyn Connection) -> ConnectionResponse {
    match conn.close().await {
        Ok(()) => ConnectionResponse {
            success: true,
            connection_id: Some(conn.id().to_string()),
            error: None,
        },
        Err(e) => ConnectionResponse {
            success: false,
            connection_id: Some(conn.id().to_string()),
            error: Some(e.to_string()),
        },
    }
}
