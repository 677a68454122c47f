//! Error types

use thiserror::Error;

/// Startup configuration errors. All of these are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unexpected number of override arguments: {0} (expected sensor/value pairs)")]
    OddArgumentCount(usize),

    #[error("Invalid hex {field} '{token}'")]
    InvalidHex { field: &'static str, token: String },

    #[error("Sensor 0x{0:02X} already has a response defined")]
    DuplicateSensor(u8),

    #[error("Sensor 0x{0:02X} is not in the supported sensor catalog")]
    UnknownSensor(u8),

    #[error("Sensor 0x{sensor_id:02X} has a {payload_length}-byte payload; only 2-byte sensors can be overridden")]
    UnsupportedPayloadLength { sensor_id: u8, payload_length: u8 },

    #[error("{0} must be at least 1 ms")]
    ZeroTimeout(&'static str),

    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serial link errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[cfg(feature = "ftdi")]
    #[error("FTDI error: {0}")]
    Ftdi(#[from] libftd2xx::FtStatus),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout: expected {expected} bytes, got {received}")]
    Timeout { expected: usize, received: usize },

    #[error("The {0} backend is not available in this build")]
    BackendUnavailable(&'static str),
}
