//! Error types for the Roomba OI driver

use crate::mode::Mode;
use crate::protocol::SensorId;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Roomba OI driver error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port could not be opened
    #[error("Connection failed: {0}")]
    Connection(#[from] serialport::Error),

    /// I/O error on an open transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command was issued below its required control mode
    #[error("Precondition not met: requires {required} mode, currently {actual}")]
    PreconditionNotMet {
        /// Minimum mode the command needs
        required: Mode,
        /// Mode tracked at the time of the call
        actual: Mode,
    },

    /// A numeric field outside its documented range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Sensor read before any telemetry frame populated it
    #[error("Sensor {0} has no value yet (is the stream running?)")]
    SensorNotAvailable(SensorId),

    /// Configuration file parse error
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file write error
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}
