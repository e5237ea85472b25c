//! Common error types for network operations

/// Sentinel status: the connection could not be established.
pub const STATUS_CONNECTION_FAILED: i32 = -1;
/// Sentinel status: the client was used incorrectly (no connection, or a
/// request that does not fit the fixed buffers).
pub const STATUS_API: i32 = -2;
/// Sentinel status: writing the request failed or timed out.
pub const STATUS_TIMED_OUT: i32 = -3;
/// Sentinel status: the server did not answer with a valid status line.
pub const STATUS_INVALID_RESPONSE: i32 = -4;

/// A common error type for network operations.
///
/// This enum defines a set of common errors that can occur when working with
/// network devices. It is designed to be simple and portable for `no_std`
/// environments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on a connection that is not open.
    NotOpen,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// A connection attempt was refused.
    ConnectionRefused,
    /// A timeout occurred.
    Timeout,
    /// The connection was closed.
    ConnectionClosed,
    /// An invalid address was provided.
    InvalidAddress,
    /// A protocol-specific error occurred.
    ProtocolError,
    /// Data did not fit into a fixed-capacity buffer.
    BufferOverflow,
}

impl Error {
    /// The negative sentinel placed in a response's status code when this
    /// error ends an exchange.
    pub const fn status_code(self) -> i32 {
        match self {
            Error::ConnectionRefused | Error::InvalidAddress => STATUS_CONNECTION_FAILED,
            Error::NotOpen | Error::BufferOverflow => STATUS_API,
            Error::Timeout | Error::WriteError => STATUS_TIMED_OUT,
            Error::ReadError | Error::ConnectionClosed | Error::ProtocolError => {
                STATUS_INVALID_RESPONSE
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotOpen => defmt::write!(f, "NotOpen"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
            Error::BufferOverflow => defmt::write!(f, "BufferOverflow"),
        }
    }
}
