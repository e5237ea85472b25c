//! The exchange engine.
//!
//! A [`Client`] drives one logical exchange at a time over its [`Transport`]:
//! it serializes the [`Request`], reads the status line and headers into a
//! [`Response`], and for GET follows redirects until the hop budget runs out.
//!
//! Redirects are followed in a loop over the current `(host, port, path)`:
//!
//! - a `Location` on the same host (compared ignoring case) tears the
//!   connection down and replays the request at the new path, keeping the
//!   current port even when the URL names another scheme or port;
//! - a `Location` on another host tears the connection down, waits
//!   [`Options::settle_delay_ms`] and connects to the new host.
//!
//! Either way one hop is consumed. POST responses are never redirected.

use super::location::RedirectTarget;
use super::request::Request;
use super::response::Response;
use super::transport::Transport;
use super::{DEFAULT_REDIRECT_HOPS, MAX_HOST_LEN, MAX_PATH_LEN, MAX_RESPONSE_BODY_LEN, Method};
use crate::network::error::{Error, STATUS_TIMED_OUT};
use core::fmt::Write as _;
use heapless::String;

/// Delay between closing a connection and opening one to a new host.
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 100;

// An absolute `Location` URL: scheme, host, port and path.
const MAX_LOCATION_LEN: usize = MAX_HOST_LEN + MAX_PATH_LEN + 16;

/// Options for configuring the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Redirect hops [`Client::get`] follows.
    pub max_redirects: u8,
    /// Milliseconds to wait before connecting to a new host on redirect.
    pub settle_delay_ms: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_REDIRECT_HOPS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

/// An HTTP client bound to one server.
///
/// Every exchange returns a [`Response`]; failures of the transport are
/// reported through negative status codes rather than errors, see
/// [`crate::network::error`].
#[derive(Debug)]
pub struct Client<T: Transport> {
    transport: T,
    host: String<MAX_HOST_LEN>,
    port: u16,
    options: Options,
}

impl<T: Transport> Client<T> {
    /// Creates a client for `host:port` with default [`Options`].
    pub fn new(transport: T, host: &str, port: u16) -> Result<Self, Error> {
        Self::with_options(transport, host, port, Options::default())
    }

    /// Creates a client for `host:port`.
    pub fn with_options(
        transport: T,
        host: &str,
        port: u16,
        options: Options,
    ) -> Result<Self, Error> {
        if host.is_empty() {
            return Err(Error::InvalidAddress);
        }
        Ok(Self {
            transport,
            host: String::try_from(host).map_err(|_| Error::InvalidAddress)?,
            port,
            options,
        })
    }

    /// The server this client was created for.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port this client was created for.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The client's options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Consumes the client, returning its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Posts `request` to `path`, e.g. `/device_1/shadow`.
    pub fn post(&mut self, path: &str, request: &Request) -> Response {
        self.post_with(path, request, false)
    }

    /// Posts `request` to `path`.
    ///
    /// With `skip_body` the response body is left on the connection: read it
    /// with [`read_body`](Client::read_body), then call
    /// [`stop`](Client::stop).
    pub fn post_with(&mut self, path: &str, request: &Request, skip_body: bool) -> Response {
        self.exchange(Method::Post, path, Some(request), skip_body, 0)
    }

    /// Gets `path`, following up to [`Options::max_redirects`] redirects.
    pub fn get(&mut self, path: &str, request: Option<&Request>) -> Response {
        let hops = self.options.max_redirects;
        self.exchange(Method::Get, path, request, false, hops)
    }

    /// Gets `path`, following up to `hops` redirects.
    ///
    /// With `skip_body` the response body is left on the connection, see
    /// [`post_with`](Client::post_with).
    pub fn get_with(
        &mut self,
        path: &str,
        request: Option<&Request>,
        skip_body: bool,
        hops: u8,
    ) -> Response {
        self.exchange(Method::Get, path, request, skip_body, hops)
    }

    /// Streams the body of a response fetched with `skip_body`.
    /// `Ok(0)` marks its end.
    pub fn read_body(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.transport.read_body(buf)
    }

    /// Releases the connection.
    pub fn stop(&mut self) {
        self.transport.stop();
    }

    fn exchange(
        &mut self,
        method: Method,
        path: &str,
        request: Option<&Request>,
        skip_body: bool,
        mut hops: u8,
    ) -> Response {
        let mut host = self.host.clone();
        let mut port = self.port;
        let Ok(mut path) = String::<MAX_PATH_LEN>::try_from(path) else {
            warn!("path longer than {} bytes", MAX_PATH_LEN);
            return Response::from_error(Error::BufferOverflow);
        };

        loop {
            if let Some(request) = request {
                if let Err(error) = request.append_query(&mut path) {
                    warn!("query does not fit in {} bytes", MAX_PATH_LEN);
                    return Response::from_error(error);
                }
            }

            let mut response = Response::new();
            if let Err(error) = self.send(method, &host, port, &path, request) {
                response.status_code = error.status_code();
                self.transport.stop();
                return response;
            }
            if self.transport.write_error().is_some() {
                warn!("sending {} {} timed out", method, path.as_str());
                response.status_code = STATUS_TIMED_OUT;
                self.transport.stop();
                return response;
            }

            let status = match self.transport.read_status() {
                Ok(status) => status,
                Err(error) => {
                    warn!("no valid status line from {}", host.as_str());
                    response.status_code = error.status_code();
                    self.transport.stop();
                    return response;
                }
            };
            response.status_code = i32::from(status);
            let location = self.capture_headers(&mut response);

            if method == Method::Get && is_redirect(status) && hops > 0 {
                let target = location
                    .as_deref()
                    .and_then(|location| RedirectTarget::parse(location, &host, port));
                if let Some(target) = target {
                    debug!(
                        "{} redirect to {}:{}{}",
                        status,
                        target.host.as_str(),
                        target.port,
                        target.path.as_str()
                    );
                    self.transport.stop();
                    // A same-host hop stays on the current port.
                    if target.is_cross_host(&host) {
                        self.transport.settle(self.options.settle_delay_ms);
                        host = target.host;
                        port = target.port;
                    }
                    hops -= 1;
                    path = target.path;
                    continue;
                }
            }

            response.content_length = self.transport.content_length();
            response.is_chunked = self.transport.is_chunked();
            if !skip_body {
                self.read_full_body(&mut response);
                self.transport.stop();
            }
            return response;
        }
    }

    fn send(
        &mut self,
        method: Method,
        host: &str,
        port: u16,
        path: &str,
        request: Option<&Request>,
    ) -> Result<(), Error> {
        let body = request.map(Request::body).unwrap_or_default();
        let mut length: String<20> = String::new();
        write!(length, "{}", body.len()).map_err(|_| Error::BufferOverflow)?;

        self.transport.begin_request(host, port, method, path)?;
        for header in request.into_iter().flat_map(Request::headers) {
            self.transport.send_header(&header.key, &header.value);
        }
        // POST always announces its length, even when empty.
        if !body.is_empty() || method == Method::Post {
            self.transport.send_header("Content-Length", &length);
            self.transport.begin_body();
            self.transport.write_body(body.as_bytes());
        }
        self.transport.end_request();
        Ok(())
    }

    // Stores at most `MAX_HEADERS` headers but drains them all, so a
    // `Location` arriving after the cap is still seen.
    fn capture_headers(&mut self, response: &mut Response) -> Option<String<MAX_LOCATION_LEN>> {
        let mut location = None;
        while let Some((name, value)) = self.transport.next_header() {
            if name.eq_ignore_ascii_case("Location") {
                location = String::try_from(value).ok();
                if location.is_none() {
                    warn!("Location longer than {} bytes ignored", MAX_LOCATION_LEN);
                }
            }
            response.headers.add(name, value);
        }
        location
    }

    fn read_full_body(&mut self, response: &mut Response) {
        let mut buf = [0u8; 128];
        loop {
            match self.transport.read_body(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let room = MAX_RESPONSE_BODY_LEN - response.body.len();
                    let _ = response.body.extend_from_slice(&buf[..n.min(room)]);
                    if n > room {
                        warn!("body longer than {} bytes truncated", MAX_RESPONSE_BODY_LEN);
                        response.truncated = true;
                        break;
                    }
                }
                Err(_) => {
                    warn!("body read failed after {} bytes", response.body.len());
                    response.truncated = true;
                    break;
                }
            }
        }
    }
}

fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 307 | 308)
}
