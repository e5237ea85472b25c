//! # libiot-http - bounded HTTP for constrained IoT devices
//!
//! A minimal-footprint HTTP/1.1 request/response layer for devices with
//! kilobytes of RAM. Every header set, path and body lives in fixed-capacity
//! storage decided at compile time, so a misbehaving server can never force
//! the device into unbounded memory growth.
//!
//! ## Features
//!
//! - **Bounded models**: [`Request`](network::application::http::Request) and
//!   [`Response`](network::application::http::Response) keep headers and query
//!   parameters in capped, insertion-ordered sets
//! - **Exchange engine**: GET/POST over any byte-stream transport, with
//!   transport failures surfaced as negative sentinel status codes
//! - **Redirects**: 301/302/307/308 on GET are followed on the same host or
//!   on a fresh connection to a new host, within a hop budget
//! - **Transport agnostic**: works with anything implementing
//!   [`Connect`](network::Connect), or with a custom
//!   [`Transport`](network::application::http::Transport)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use libiot_http::network::application::http::{Client, Request, StreamTransport};
//! use libiot_http::network::{Close, Connect, Connection, NoDelay, Read, Write};
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl Read for MockConnection {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for MockConnection {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Close for MockConnection {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockNetwork;
//! # impl Connect for MockNetwork {
//! #     type Connection = MockConnection;
//! #     type Error = libiot_http::network::error::Error;
//! #     fn connect(&mut self, _remote: &str) -> Result<MockConnection, Self::Error> { Ok(MockConnection) }
//! # }
//!
//! let transport = StreamTransport::new(MockNetwork, NoDelay);
//! let mut client = Client::new(transport, "api.example.com", 80).unwrap();
//!
//! let mut request = Request::new();
//! request.add_header("Authorization", "token123");
//! request.add_param("id", "42");
//! request.set_body(r#"{"x":1}"#).unwrap();
//!
//! let response = client.post("/device_1/shadow", &request);
//! if response.success() {
//!     // response.text(), response.header("X-Req-Id"), ...
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable the `std::net` TCP connector (default: disabled)
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

// Must stay first so the diagnostic macros are in scope for every module below.
#[macro_use]
mod fmt;

/// Network abstraction layer: byte-stream transport traits and the HTTP
/// application protocol built on top of them.
pub mod network;

/// ISO-8601 timestamp helpers commonly needed when talking to cloud APIs.
pub mod time;
