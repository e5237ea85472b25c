//! Blocking TCP connector over `std::net`, for Linux-class devices and tests.

use super::error::Error;
use super::{Close, Connect, Connection, Delay, Read, Write};
use std::io::{ErrorKind, Read as StdRead, Write as StdWrite};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// Opens [`TcpConnection`]s with an optional read/write timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector {
    /// Socket timeout applied to reads and writes. `None` blocks forever.
    pub timeout: Option<Duration>,
}

impl TcpConnector {
    /// Creates a connector whose sockets time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

impl Connect for TcpConnector {
    type Connection = TcpConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        let stream = TcpStream::connect(remote).map_err(|e| match e.kind() {
            ErrorKind::TimedOut => Error::Timeout,
            ErrorKind::InvalidInput => Error::InvalidAddress,
            _ => Error::ConnectionRefused,
        })?;
        stream
            .set_read_timeout(self.timeout)
            .map_err(|_| Error::InvalidAddress)?;
        stream
            .set_write_timeout(self.timeout)
            .map_err(|_| Error::InvalidAddress)?;
        Ok(TcpConnection { stream })
    }
}

/// A connected TCP stream.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
}

impl Read for TcpConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.stream.read(buf).map_err(|e| match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => Error::Timeout,
            _ => Error::ReadError,
        })
    }
}

impl Write for TcpConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream.write(buf).map_err(|_| Error::WriteError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush().map_err(|_| Error::WriteError)
    }
}

impl Close for TcpConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        self.stream
            .shutdown(Shutdown::Both)
            .map_err(|_| Error::ConnectionClosed)
    }
}

impl Connection for TcpConnection {}

/// A [`Delay`] backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
