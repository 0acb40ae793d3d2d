//! Custom error types for the library.
//!
//! `LaserError` is the single error type returned by every fallible operation
//! in the core: transport round trips, property access, model detection and
//! shutter control. It is built with `thiserror` so that adapter failures
//! (`std::io::Error`, `serialport::Error`) convert with `?`.
//!
//! ## Error Kinds
//!
//! Host bindings usually want a coarse classification rather than the full
//! enum, so every variant maps onto an [`ErrorKind`] and onto the numeric
//! return code the instrument driver protocol has always used:
//!
//! | Kind                   | Code     |
//! |------------------------|----------|
//! | `Generic`              | 1        |
//! | `InvalidPropertyValue` | 3        |
//! | `UnsupportedCommand`   | 11       |
//! | `IllegalPortChange`    | 101001   |
//! | `SerialPortUndefined`  | 101002   |
//! | `LaserOff`             | 101003   |
//!
//! Transport, response and detection failures have no dedicated code and
//! report the generic one.

use thiserror::Error;

/// Convenience alias for results using the library error type.
pub type LaserResult<T> = std::result::Result<T, LaserError>;

/// Return code reported for a successful operation.
pub const RETURN_CODE_OK: i32 = 0;

#[derive(Error, Debug)]
pub enum LaserError {
    #[error("{0}")]
    Generic(String),

    #[error("Property '{0}' is read-only")]
    ReadOnlyProperty(String),

    #[error("Unknown property '{0}'")]
    UnknownProperty(String),

    #[error("Invalid value '{value}' for property '{property}': {reason}")]
    InvalidPropertyValue {
        property: String,
        value: String,
        reason: String,
    },

    #[error("Command '{command}' rejected by laser: {response}")]
    UnsupportedCommand { command: String, response: String },

    #[error("Port change not allowed")]
    IllegalPortChange,

    #[error("No valid serial port selected")]
    SerialPortUndefined,

    #[error("Laser is off")]
    LaserOff,

    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[cfg(feature = "instrument_serial")]
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    #[error("Serial support not enabled. Rebuild with --features instrument_serial")]
    SerialFeatureDisabled,

    #[error("Invalid response to '{command}': '{response}'")]
    InvalidResponse { command: String, response: String },

    #[error("Laser model detection failed: {0}")]
    ModelDetectionFailed(#[source] Box<LaserError>),
}

/// Coarse classification of a [`LaserError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Anything without a more specific kind.
    Generic,
    /// Value outside the declared range or not a registered enumeration value.
    InvalidPropertyValue,
    /// The instrument answered with an error.
    UnsupportedCommand,
    /// Port changed after initialization.
    IllegalPortChange,
    /// Initialization attempted without a port.
    SerialPortUndefined,
    /// Shutter operation requires the laser to be on.
    LaserOff,
    /// The channel write or read failed.
    Transport,
    /// The response could not be parsed or mapped.
    InvalidResponse,
    /// The identification query failed, no model exists.
    ModelDetectionFailed,
}

impl LaserError {
    /// Builds an [`LaserError::InvalidPropertyValue`].
    pub fn invalid_value(
        property: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        LaserError::InvalidPropertyValue {
            property: property.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Builds an [`LaserError::InvalidResponse`].
    pub fn invalid_response(command: impl Into<String>, response: impl Into<String>) -> Self {
        LaserError::InvalidResponse {
            command: command.into(),
            response: response.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LaserError::Generic(_)
            | LaserError::ReadOnlyProperty(_)
            | LaserError::UnknownProperty(_)
            | LaserError::SerialFeatureDisabled => ErrorKind::Generic,
            LaserError::InvalidPropertyValue { .. } => ErrorKind::InvalidPropertyValue,
            LaserError::UnsupportedCommand { .. } => ErrorKind::UnsupportedCommand,
            LaserError::IllegalPortChange => ErrorKind::IllegalPortChange,
            LaserError::SerialPortUndefined => ErrorKind::SerialPortUndefined,
            LaserError::LaserOff => ErrorKind::LaserOff,
            LaserError::Transport(_) => ErrorKind::Transport,
            #[cfg(feature = "instrument_serial")]
            LaserError::SerialPort(_) => ErrorKind::Transport,
            LaserError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            LaserError::ModelDetectionFailed(_) => ErrorKind::ModelDetectionFailed,
        }
    }

    /// Numeric return code for host bindings.
    pub fn code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidPropertyValue => 3,
            ErrorKind::UnsupportedCommand => 11,
            ErrorKind::IllegalPortChange => 101_001,
            ErrorKind::SerialPortUndefined => 101_002,
            ErrorKind::LaserOff => 101_003,
            ErrorKind::Generic
            | ErrorKind::Transport
            | ErrorKind::InvalidResponse
            | ErrorKind::ModelDetectionFailed => 1,
        }
    }
}

/// Collapses an operation result into a host return code.
pub fn return_code<T>(result: &LaserResult<T>) -> i32 {
    match result {
        Ok(_) => RETURN_CODE_OK,
        Err(err) => err.code(),
    }
}
