use super::kv::KeyValueSet;
use super::{MAX_HEADERS, MAX_RESPONSE_BODY_LEN};
use crate::network::error::Error;
use heapless::Vec;
use serde::Deserialize;

/// The result of an exchange.
///
/// `status_code` holds either an HTTP status (100-599) sent by the server, or
/// a negative sentinel from [`crate::network::error`] when the transport
/// failed before a status line was received. A `Response` is filled in by the
/// [`Client`](super::Client) and is read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub(crate) status_code: i32,
    pub(crate) headers: KeyValueSet<MAX_HEADERS>,
    pub(crate) body: Vec<u8, MAX_RESPONSE_BODY_LEN>,
    pub(crate) content_length: Option<usize>,
    pub(crate) is_chunked: bool,
    pub(crate) truncated: bool,
}

impl Response {
    /// Creates an empty response with status code 0.
    pub const fn new() -> Self {
        Self {
            status_code: 0,
            headers: KeyValueSet::new(),
            body: Vec::new(),
            content_length: None,
            is_chunked: false,
            truncated: false,
        }
    }

    /// Creates a response that carries only a sentinel for `error`.
    pub fn from_error(error: Error) -> Self {
        let mut response = Self::new();
        response.status_code = error.status_code();
        response
    }

    /// Whether the status code is in the 2xx range.
    pub fn success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// HTTP status, or a negative sentinel on transport failure.
    pub fn status_code(&self) -> i32 {
        self.status_code
    }

    /// The captured headers, at most [`MAX_HEADERS`], in arrival order.
    pub fn headers(&self) -> &KeyValueSet<MAX_HEADERS> {
        &self.headers
    }

    /// Number of captured headers.
    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// Value of the first captured header named `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.find(name)
    }

    /// The body bytes. Empty when the body was skipped.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as text, or `None` if it is not valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        core::str::from_utf8(&self.body).ok()
    }

    /// Deserializes the JSON body.
    pub fn json<'a, T: Deserialize<'a>>(&'a self) -> Result<T, Error> {
        serde_json_core::from_slice(&self.body)
            .map(|(value, _)| value)
            .map_err(|_| Error::ProtocolError)
    }

    /// `Content-Length` announced by the server, if any.
    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    /// Whether the server used chunked transfer encoding.
    pub fn is_chunked(&self) -> bool {
        self.is_chunked
    }

    /// Whether the body was cut short, because it did not fit in
    /// [`MAX_RESPONSE_BODY_LEN`] or because the connection failed mid-body.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Resets every field, so the response can be recycled.
    pub fn clear(&mut self) {
        self.status_code = 0;
        self.headers.clear();
        self.body.clear();
        self.content_length = None;
        self.is_chunked = false;
        self.truncated = false;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Response {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Response {{ status: {}, headers: {}, content_length: {}, chunked: {}, body: {=[u8]:a} }}",
            self.status_code,
            self.headers,
            self.content_length,
            self.is_chunked,
            self.body.as_slice()
        )
    }
}
