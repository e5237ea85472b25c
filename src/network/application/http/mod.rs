//! HTTP/1.1 protocol implementation for embedded systems.
//!
//! This module provides a lightweight HTTP client designed for `no_std`
//! environments with very little RAM. Headers, query parameters, paths and
//! bodies are all stored in fixed-capacity buffers sized by the constants
//! below.
//!
//! # Features
//!
//! - Synchronous request/response model
//! - GET and POST, with custom headers and query parameters
//! - Capped response header capture that still always sees `Location`
//! - Redirect following for GET (301, 302, 307, 308) within a hop budget
//! - Transport failures reported as negative status codes
//!
//! # Layers
//!
//! - [`Request`] / [`Response`]: the bounded models
//! - [`Client`]: the exchange engine, driving one logical exchange at a time
//! - [`Transport`]: the HTTP-over-stream primitives the engine consumes;
//!   [`StreamTransport`] implements them over any [`Connect`](crate::network::Connect)
//!
//! ```rust,no_run
//! use libiot_http::network::application::http::{Client, Request, Transport};
//!
//! fn fetch_version<T: Transport>(client: &mut Client<T>) -> bool {
//!     let mut request = Request::new();
//!     request.add_header("Authorization", "token123");
//!     request.add_param("channel", "stable");
//!
//!     let response = client.get("/version", Some(&request));
//!     response.success()
//! }
//! ```

/// The exchange engine.
pub mod client;
/// Bounded key-value storage for headers and query parameters.
pub mod kv;
/// Redirect-target parsing.
pub mod location;
/// The outbound request model.
pub mod request;
/// The inbound response model.
pub mod response;
/// The HTTP-over-stream transport contract and its stream implementation.
pub mod transport;

pub use client::{Client, Options};
pub use kv::{KeyValuePair, KeyValueSet};
pub use location::{RedirectTarget, endpoint_from_url};
pub use request::Request;
pub use response::Response;
pub use transport::{StreamTransport, Transport};

/// Maximum number of headers (and, separately, query parameters) kept.
pub const MAX_HEADERS: usize = 10;
/// Maximum length of a header or parameter key.
pub const MAX_KEY_LEN: usize = 64;
/// Maximum length of a header or parameter value.
pub const MAX_VALUE_LEN: usize = 256;
/// Maximum length of a request path, query string included.
pub const MAX_PATH_LEN: usize = 256;
/// Maximum length of a host name.
pub const MAX_HOST_LEN: usize = 64;
/// Maximum length of a request body.
pub const MAX_REQUEST_BODY_LEN: usize = 1024;
/// Maximum length of a response body kept in memory.
pub const MAX_RESPONSE_BODY_LEN: usize = 2048;
/// Redirect hops followed when the caller does not say otherwise.
pub const DEFAULT_REDIRECT_HOPS: u8 = 3;

/// Default port for `http` URLs.
pub const HTTP_PORT: u16 = 80;
/// Default port for `https` URLs.
pub const HTTPS_PORT: u16 = 443;

/// HTTP request methods supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl Method {
    /// The method token as written on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Method {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}
