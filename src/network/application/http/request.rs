use super::kv::KeyValueSet;
use super::{MAX_HEADERS, MAX_PATH_LEN, MAX_REQUEST_BODY_LEN};
use crate::network::error::Error;
use base64ct::{Base64, Encoding};
use heapless::String;
use serde::Serialize;

/// An outbound HTTP request: headers, query parameters and an optional body.
///
/// A request is built once and can be reused across exchanges. Use
/// [`clear`](Request::clear) with `keep_headers = true` to keep, say, an
/// `Authorization` header while replacing the query and body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    headers: KeyValueSet<MAX_HEADERS>,
    params: KeyValueSet<MAX_HEADERS>,
    body: String<MAX_REQUEST_BODY_LEN>,
}

impl Request {
    /// Creates an empty request.
    pub const fn new() -> Self {
        Self {
            headers: KeyValueSet::new(),
            params: KeyValueSet::new(),
            body: String::new(),
        }
    }

    /// Adds a header. Returns `false` if it was dropped for lack of room.
    pub fn add_header(&mut self, key: &str, value: &str) -> bool {
        self.headers.add(key, value)
    }

    /// Adds a query parameter. Returns `false` if it was dropped for lack of
    /// room.
    ///
    /// Values are sent as given: reserved characters must already be
    /// percent-encoded.
    pub fn add_param(&mut self, key: &str, value: &str) -> bool {
        self.params.add(key, value)
    }

    /// Adds an `Authorization: Basic ...` header for `user` and `password`.
    pub fn add_basic_auth(&mut self, user: &str, password: &str) -> Result<(), Error> {
        let mut credentials: String<MAX_CREDENTIALS_LEN> = String::new();
        credentials
            .push_str(user)
            .and_then(|_| credentials.push(':'))
            .and_then(|_| credentials.push_str(password))
            .map_err(|_| Error::BufferOverflow)?;

        let mut value = [0u8; super::MAX_VALUE_LEN];
        let prefix = b"Basic ";
        value[..prefix.len()].copy_from_slice(prefix);
        let encoded = Base64::encode(credentials.as_bytes(), &mut value[prefix.len()..])
            .map_err(|_| Error::BufferOverflow)?;
        let len = prefix.len() + encoded.len();
        let value = core::str::from_utf8(&value[..len]).map_err(|_| Error::ProtocolError)?;

        if self.headers.add("Authorization", value) {
            Ok(())
        } else {
            Err(Error::BufferOverflow)
        }
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: &str) -> Result<(), Error> {
        self.body.clear();
        self.body.push_str(body).map_err(|_| Error::BufferOverflow)
    }

    /// Replaces the body with `value` serialized as JSON.
    ///
    /// Does not add a `Content-Type` header.
    pub fn set_json<T: Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.body = serde_json_core::to_string::<T, MAX_REQUEST_BODY_LEN>(value)
            .map_err(|_| Error::BufferOverflow)?;
        Ok(())
    }

    /// Clears body and parameters, and headers too unless `keep_headers`.
    pub fn clear(&mut self, keep_headers: bool) {
        self.body.clear();
        self.params.clear();
        if !keep_headers {
            self.headers.clear();
        }
    }

    /// Outbound headers, in insertion order.
    pub fn headers(&self) -> &KeyValueSet<MAX_HEADERS> {
        &self.headers
    }

    /// Outbound query parameters, in insertion order.
    pub fn params(&self) -> &KeyValueSet<MAX_HEADERS> {
        &self.params
    }

    /// The body, empty when there is none.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Appends the parameters to `path` as `?k=v&k=v`.
    ///
    /// Nothing is appended when `path` already carries a query string, so a
    /// redirect target that includes one is replayed as-is.
    pub fn append_query<const P: usize>(&self, path: &mut String<P>) -> Result<(), Error> {
        if path.contains('?') {
            return Ok(());
        }
        for (i, param) in self.params.iter().enumerate() {
            let separator = if i == 0 { '?' } else { '&' };
            path.push(separator)
                .and_then(|_| path.push_str(&param.key))
                .and_then(|_| path.push('='))
                .and_then(|_| path.push_str(&param.value))
                .map_err(|_| Error::BufferOverflow)?;
        }
        Ok(())
    }

    /// `base_path` with the parameters appended, see
    /// [`append_query`](Request::append_query).
    pub fn serialize_query(&self, base_path: &str) -> Result<String<MAX_PATH_LEN>, Error> {
        let mut path = String::try_from(base_path).map_err(|_| Error::BufferOverflow)?;
        self.append_query(&mut path)?;
        Ok(path)
    }
}

// `user:password` before encoding; base64 grows it by a third.
const MAX_CREDENTIALS_LEN: usize = (super::MAX_VALUE_LEN - 6) / 4 * 3;

#[cfg(feature = "defmt")]
impl defmt::Format for Request {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Request {{ headers: {}, params: {}, body: {=str} }}",
            self.headers,
            self.params,
            self.body.as_str()
        )
    }
}
