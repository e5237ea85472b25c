//! The transport seam between the exchange engine and the network.
//!
//! [`Transport`] is the blocking HTTP-over-stream contract the
//! [`Client`](super::Client) drives: start a request, write headers and body,
//! then read the status line, headers and body back. [`StreamTransport`]
//! implements it on top of any [`Connect`], speaking HTTP/1.1 over the raw
//! byte stream with fixed-size buffers.

use super::{HTTP_PORT, HTTPS_PORT, MAX_HOST_LEN, MAX_KEY_LEN, MAX_VALUE_LEN, Method};
use crate::network::error::Error;
use crate::network::{Close, Connect, Delay, NoDelay, Read, Write};
use core::fmt::Write as _;
use core::ops::Range;
use heapless::{String, Vec};

/// `User-Agent` sent when the request does not carry one.
pub const USER_AGENT: &str = concat!("libiot-http/", env!("CARGO_PKG_VERSION"));

const RX_BUF_LEN: usize = 256;
const MAX_LINE_LEN: usize = MAX_KEY_LEN + MAX_VALUE_LEN + 64;

/// Blocking HTTP-over-stream primitives.
///
/// Write operations latch their first failure instead of returning it; the
/// engine checks [`write_error`](Transport::write_error) once the whole
/// request has been sent.
pub trait Transport {
    /// Connects to `host:port` and writes the request line for `method` and
    /// `path`. An error means no connection could be established.
    fn begin_request(&mut self, host: &str, port: u16, method: Method, path: &str)
    -> Result<(), Error>;

    /// Writes one request header.
    fn send_header(&mut self, name: &str, value: &str);

    /// Ends the header block; what follows is the body.
    fn begin_body(&mut self);

    /// Writes raw body bytes.
    fn write_body(&mut self, bytes: &[u8]);

    /// Ends the request and flushes it to the peer.
    fn end_request(&mut self);

    /// The first write fault since [`begin_request`](Transport::begin_request), if any.
    fn write_error(&self) -> Option<Error>;

    /// Reads the status line and returns the status code. Interim `1xx`
    /// responses are skipped.
    fn read_status(&mut self) -> Result<u16, Error>;

    /// The next response header as `(name, value)`, or `None` once the
    /// header block is exhausted or the stream failed.
    fn next_header(&mut self) -> Option<(&str, &str)>;

    /// `Content-Length` of the current response, once its headers are read.
    fn content_length(&self) -> Option<usize>;

    /// Whether the current response uses chunked transfer encoding.
    fn is_chunked(&self) -> bool;

    /// Reads decoded body bytes into `buf`. Unread headers are skipped
    /// first. `Ok(0)` marks the end of the body.
    fn read_body(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    /// Flushes and closes the connection, if one is open.
    fn stop(&mut self);

    /// Blocks for `ms` milliseconds between a disconnect and a connect to
    /// another host.
    fn settle(&mut self, ms: u32);
}

/// HTTP/1.1 over a [`Connect`]or's byte streams.
///
/// Connect failures are reported as the connector's own error converted into
/// [`Error`], so a timeout stays a timeout.
///
/// Each request opens a fresh connection and asks the server to close it
/// afterwards (`Connection: close`), so a body without `Content-Length` or
/// chunked encoding simply runs until the peer closes.
pub struct StreamTransport<N: Connect, D: Delay = NoDelay> {
    connector: N,
    delay: D,
    connection: Option<N::Connection>,
    host: String<MAX_HOST_LEN>,
    port: u16,
    write_error: Option<Error>,
    sent_host: bool,
    sent_user_agent: bool,
    in_body: bool,
    rx: [u8; RX_BUF_LEN],
    rx_start: usize,
    rx_end: usize,
    line: Vec<u8, MAX_LINE_LEN>,
    status: u16,
    headers_done: bool,
    content_length: Option<usize>,
    chunked: bool,
    body_read: usize,
    chunk_remaining: usize,
    body_done: bool,
}

impl<N: Connect, D: Delay> StreamTransport<N, D> {
    /// Creates a transport that opens connections through `connector` and
    /// waits on `delay` when asked to settle.
    pub fn new(connector: N, delay: D) -> Self {
        Self {
            connector,
            delay,
            connection: None,
            host: String::new(),
            port: 0,
            write_error: None,
            sent_host: false,
            sent_user_agent: false,
            in_body: false,
            rx: [0; RX_BUF_LEN],
            rx_start: 0,
            rx_end: 0,
            line: Vec::new(),
            status: 0,
            headers_done: false,
            content_length: None,
            chunked: false,
            body_read: 0,
            chunk_remaining: 0,
            body_done: false,
        }
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// The connector this transport opens connections with.
    pub fn connector(&self) -> &N {
        &self.connector
    }

    fn reset(&mut self) {
        self.write_error = None;
        self.sent_host = false;
        self.sent_user_agent = false;
        self.in_body = false;
        self.rx_start = 0;
        self.rx_end = 0;
        self.line.clear();
        self.status = 0;
        self.headers_done = false;
        self.content_length = None;
        self.chunked = false;
        self.body_read = 0;
        self.chunk_remaining = 0;
        self.body_done = false;
    }

    fn write_all(&mut self, mut bytes: &[u8]) {
        if self.write_error.is_some() {
            return;
        }
        let Some(connection) = self.connection.as_mut() else {
            self.write_error = Some(Error::NotOpen);
            return;
        };
        while !bytes.is_empty() {
            match connection.write(bytes) {
                Ok(0) | Err(_) => {
                    warn!("write to {} failed", self.host.as_str());
                    self.write_error = Some(Error::WriteError);
                    return;
                }
                Ok(n) => bytes = &bytes[n..],
            }
        }
    }

    // Adds the headers every request needs but the caller did not send.
    fn finish_headers(&mut self)
    where
        N::Error: Into<Error>,
    {
        if !self.sent_host {
            let mut host: String<{ MAX_HOST_LEN + 6 }> = String::new();
            let written = if self.port == HTTP_PORT || self.port == HTTPS_PORT {
                host.push_str(&self.host).is_ok()
            } else {
                write!(host, "{}:{}", self.host.as_str(), self.port).is_ok()
            };
            if written {
                self.send_header("Host", &host);
            }
        }
        if !self.sent_user_agent {
            self.send_header("User-Agent", USER_AGENT);
        }
        self.write_all(b"\r\n");
        self.in_body = true;
    }

    fn fill(&mut self) -> Result<usize, Error> {
        let connection = self.connection.as_mut().ok_or(Error::NotOpen)?;
        self.rx_start = 0;
        self.rx_end = 0;
        let n = connection.read(&mut self.rx).map_err(|_| Error::ReadError)?;
        self.rx_end = n;
        Ok(n)
    }

    // Reads one line into `self.line` without its line terminator. Bytes past
    // the line buffer's capacity are discarded; returns whether any were.
    fn read_line(&mut self) -> Result<bool, Error> {
        self.line.clear();
        let mut truncated = false;
        let mut saw_any = false;
        loop {
            if self.rx_start == self.rx_end && self.fill()? == 0 {
                return if saw_any {
                    Ok(truncated)
                } else {
                    Err(Error::ConnectionClosed)
                };
            }
            saw_any = true;

            let available = &self.rx[self.rx_start..self.rx_end];
            let (chunk, consumed, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (&available[..pos], pos + 1, true),
                None => (available, available.len(), false),
            };
            let chunk = if complete {
                chunk.strip_suffix(b"\r").unwrap_or(chunk)
            } else {
                chunk
            };
            let room = self.line.capacity() - self.line.len();
            truncated |= chunk.len() > room;
            let _ = self.line.extend_from_slice(&chunk[..chunk.len().min(room)]);
            self.rx_start += consumed;

            if complete {
                if self.line.last() == Some(&b'\r') {
                    self.line.pop();
                }
                return Ok(truncated);
            }
        }
    }

    fn read_raw(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if self.rx_start < self.rx_end {
            let n = buf.len().min(self.rx_end - self.rx_start);
            buf[..n].copy_from_slice(&self.rx[self.rx_start..self.rx_start + n]);
            self.rx_start += n;
            return Ok(n);
        }
        let connection = self.connection.as_mut().ok_or(Error::NotOpen)?;
        connection.read(buf).map_err(|_| Error::ReadError)
    }

    fn start_body(&mut self) {
        self.headers_done = true;
        self.body_read = 0;
        self.chunk_remaining = 0;
        // 204 and 304 never carry a body.
        self.body_done = self.status == 204 || self.status == 304;
    }

    fn read_chunked(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if self.chunk_remaining == 0 {
            self.read_line()?;
            let size = parse_chunk_size(&self.line).ok_or(Error::ProtocolError)?;
            if size == 0 {
                // Drain trailers up to the terminating empty line.
                while self.read_line().is_ok() && !self.line.is_empty() {}
                self.body_done = true;
                return Ok(0);
            }
            self.chunk_remaining = size;
        }

        let want = buf.len().min(self.chunk_remaining);
        let n = self.read_raw(&mut buf[..want])?;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
        self.chunk_remaining -= n;
        if self.chunk_remaining == 0 {
            // CRLF closing the chunk data.
            self.read_line()?;
        }
        Ok(n)
    }
}

impl<N, D> Transport for StreamTransport<N, D>
where
    N: Connect,
    N::Error: Into<Error>,
    D: Delay,
{
    fn begin_request(
        &mut self,
        host: &str,
        port: u16,
        method: Method,
        path: &str,
    ) -> Result<(), Error> {
        self.stop();
        self.host = String::try_from(host).map_err(|_| Error::InvalidAddress)?;
        self.port = port;

        let mut remote: String<{ MAX_HOST_LEN + 6 }> = String::new();
        write!(remote, "{}:{}", host, port).map_err(|_| Error::InvalidAddress)?;
        let connection = self.connector.connect(&remote).map_err(|error| -> Error {
            warn!("connect to {} failed", remote.as_str());
            error.into()
        })?;
        self.connection = Some(connection);
        trace!("connected to {}", remote.as_str());

        self.write_all(method.as_str().as_bytes());
        self.write_all(b" ");
        self.write_all(path.as_bytes());
        self.write_all(b" HTTP/1.1\r\n");
        self.send_header("Connection", "close");
        Ok(())
    }

    fn send_header(&mut self, name: &str, value: &str) {
        if self.in_body {
            warn!("header {} sent after the body started, ignored", name);
            return;
        }
        self.sent_host |= name.eq_ignore_ascii_case("Host");
        self.sent_user_agent |= name.eq_ignore_ascii_case("User-Agent");
        self.write_all(name.as_bytes());
        self.write_all(b": ");
        self.write_all(value.as_bytes());
        self.write_all(b"\r\n");
    }

    fn begin_body(&mut self) {
        if !self.in_body {
            self.finish_headers();
        }
    }

    fn write_body(&mut self, bytes: &[u8]) {
        self.write_all(bytes);
    }

    fn end_request(&mut self) {
        if !self.in_body {
            self.finish_headers();
        }
        if self.write_error.is_some() {
            return;
        }
        if let Some(connection) = self.connection.as_mut() {
            if connection.flush().is_err() {
                self.write_error = Some(Error::WriteError);
            }
        }
    }

    fn write_error(&self) -> Option<Error> {
        self.write_error
    }

    fn read_status(&mut self) -> Result<u16, Error> {
        loop {
            self.read_line()?;
            if self.line.is_empty() {
                continue;
            }
            let status = parse_status_line(&self.line).ok_or(Error::ProtocolError)?;
            self.status = status;
            self.headers_done = false;
            self.content_length = None;
            self.chunked = false;

            // Interim responses are followed by the real one.
            if (100..200).contains(&status) && status != 101 {
                debug!("skipping interim response {}", status);
                while self.next_header().is_some() {}
                continue;
            }
            return Ok(status);
        }
    }

    fn next_header(&mut self) -> Option<(&str, &str)> {
        if self.headers_done {
            return None;
        }
        let (name, value) = loop {
            let Ok(truncated) = self.read_line() else {
                self.headers_done = true;
                return None;
            };
            if truncated {
                warn!("header line longer than {} bytes dropped", MAX_LINE_LEN);
                continue;
            }
            if self.line.is_empty() {
                self.start_body();
                return None;
            }
            if let Some(ranges) = split_header_line(&self.line) {
                break ranges;
            }
        };

        let line = core::str::from_utf8(&self.line).ok()?;
        let (name, value) = (&line[name], &line[value]);
        if name.eq_ignore_ascii_case("Content-Length") {
            self.content_length = value.parse().ok();
        } else if name.eq_ignore_ascii_case("Transfer-Encoding") {
            self.chunked = value
                .split(',')
                .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"));
        }
        Some((name, value))
    }

    fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    fn is_chunked(&self) -> bool {
        self.chunked
    }

    fn read_body(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if self.connection.is_none() {
            return Err(Error::NotOpen);
        }
        while self.next_header().is_some() {}
        if self.body_done || buf.is_empty() {
            return Ok(0);
        }

        if self.chunked {
            return self.read_chunked(buf);
        }
        match self.content_length {
            Some(len) => {
                let remaining = len.saturating_sub(self.body_read);
                if remaining == 0 {
                    self.body_done = true;
                    return Ok(0);
                }
                let want = buf.len().min(remaining);
                let n = self.read_raw(&mut buf[..want])?;
                if n == 0 {
                    return Err(Error::ConnectionClosed);
                }
                self.body_read += n;
                Ok(n)
            }
            None => {
                let n = self.read_raw(buf)?;
                if n == 0 {
                    self.body_done = true;
                }
                Ok(n)
            }
        }
    }

    fn stop(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            let _ = connection.flush();
            if connection.close().is_err() {
                warn!("closing connection to {} failed", self.host.as_str());
            }
            trace!("disconnected from {}", self.host.as_str());
        }
        self.reset();
    }

    fn settle(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl<N: Connect, D: Delay> core::fmt::Debug for StreamTransport<N, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("connected", &self.connection.is_some())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Parses `HTTP/1.x NNN reason` into `NNN`.
fn parse_status_line(line: &[u8]) -> Option<u16> {
    let line = core::str::from_utf8(line).ok()?;
    let mut parts = line.split_whitespace();
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    let status = parts.next()?.parse::<u16>().ok()?;
    (100..600).contains(&status).then_some(status)
}

/// Byte ranges of the trimmed name and value of a `name: value` line.
fn split_header_line(line: &[u8]) -> Option<(Range<usize>, Range<usize>)> {
    let text = core::str::from_utf8(line).ok()?;
    let colon = text.find(':')?;
    let name = trimmed(text, 0..colon);
    if name.is_empty() {
        return None;
    }
    Some((name, trimmed(text, colon + 1..text.len())))
}

fn trimmed(text: &str, range: Range<usize>) -> Range<usize> {
    let part = &text[range.clone()];
    let start = range.start + (part.len() - part.trim_start().len());
    let end = range.end - (part.len() - part.trim_end().len());
    start..end.max(start)
}

fn parse_chunk_size(line: &[u8]) -> Option<usize> {
    let line = core::str::from_utf8(line).ok()?;
    let size = line.split(';').next()?.trim();
    usize::from_str_radix(size, 16).ok()
}
