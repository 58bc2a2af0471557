//! Driver inspection commands.

use serde::Serialize;
use tracing::instrument;

use crate::engine::DriverInfo;
use crate::IclState;

/// Space-separated driver names, newest registration first
#[derive(Debug, Serialize)]
pub struct DriverListResponse {
    pub success: bool,
    pub drivers: String,
}

#[derive(Debug, Serialize)]
pub struct DriverDetailsResponse {
    pub success: bool,
    pub drivers: Vec<DriverInfo>,
}

#[derive(Debug, Serialize)]
pub struct LimitsResponse {
    pub success: bool,
    pub limit: Option<usize>,
    pub error: Option<String>,
    /// errno-style code, 0 on success
    pub code: i32,
}

fn normalize_offload(offload: Option<&str>) -> Option<&str> {
    offload.map(str::trim).filter(|name| !name.is_empty())
}

/// Returns the registered driver names
pub fn list_drivers(state: &IclState) -> DriverListResponse {
    DriverListResponse {
        success: true,
        drivers: state.registry.list_names(),
    }
}

/// Returns name, priority and registration time for each driver
pub fn describe_drivers(state: &IclState) -> DriverDetailsResponse {
    DriverDetailsResponse {
        success: true,
        drivers: state.registry.drivers(),
    }
}

/// Queries the limits of a named offload, or of the auto-selected one when
/// `offload` is blank
#[instrument(skip(state))]
pub fn query_limits(state: &IclState, offload: Option<&str>) -> LimitsResponse {
    match state.registry.limits(normalize_offload(offload)) {
        Ok(limit) => LimitsResponse {
            success: true,
            limit: Some(limit),
            error: None,
            code: 0,
        },
        Err(e) => LimitsResponse {
            success: false,
            limit: None,
            error: Some(e.to_string()),
            code: e.code(),
        },
    }
}
