//! Serial error types

use thiserror::Error;

/// Errors raised while reading the serial stream
///
/// All of them are fatal to the relay: the stream is not reopened.
#[derive(Error, Debug)]
pub enum SerialError {
    /// The device could not be opened
    #[error("Failed to open serial port {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: tokio_serial::Error,
    },

    /// Read from the device failed (e.g. the device was unplugged)
    #[error("Serial read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for serial operations
pub type SerialResult<T> = Result<T, SerialError>;
