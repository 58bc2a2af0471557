//! Engine errors
//!
//! Every fallible registry operation reports one of these synchronously.
//! `code()` gives the errno-style value callers of the common layer expect.

use thiserror::Error;

pub const ENXIO: i32 = 6;
pub const EIO: i32 = 5;
pub const EBUSY: i32 = 16;
pub const EINVAL: i32 = 22;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Offload \"{name}\" already registered")]
    AlreadyRegistered { name: String },

    #[error("Offload \"{name}\" not found")]
    DriverNotFound { name: String },

    #[error("Invalid offload name: {reason}")]
    InvalidName { reason: String },

    #[error("Offload \"{offload}\" failed to create a connection")]
    ConnectionFailed { offload: String },

    #[error("Driver error ({code}): {message}")]
    Driver { code: i32, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    pub fn already_registered(name: impl Into<String>) -> Self {
        Self::AlreadyRegistered { name: name.into() }
    }

    pub fn driver_not_found(name: impl Into<String>) -> Self {
        Self::DriverNotFound { name: name.into() }
    }

    pub fn invalid_name(reason: impl Into<String>) -> Self {
        Self::InvalidName {
            reason: reason.into(),
        }
    }

    pub fn connection_failed(offload: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            offload: offload.into(),
        }
    }

    pub fn driver(code: i32, message: impl Into<String>) -> Self {
        Self::Driver {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the errno-style code for this error.
    ///
    /// Driver failures keep whatever code the driver reported.
    pub fn code(&self) -> i32 {
        match self {
            Self::AlreadyRegistered { .. } => EBUSY,
            Self::DriverNotFound { .. } => ENXIO,
            Self::InvalidName { .. } => EINVAL,
            Self::ConnectionFailed { .. } => EIO,
            Self::Driver { code, .. } => *code,
            Self::Internal { .. } => EIO,
        }
    }
}
