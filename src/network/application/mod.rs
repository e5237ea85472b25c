//! # Application Layer Network Protocols
//!
//! Application layer (OSI Layer 7) protocols built on the core network
//! traits.
//!
//! ## Design Principles
//!
//! - **Connection Agnostic**: Work with any type implementing [`Connect`](crate::network::Connect)
//! - **No-std Compatible**: No heap allocation, every buffer has a fixed capacity
//! - **Bounded**: Input from the peer can never grow memory past those capacities
//! - **Status Driven**: Transport failures are reported in the response, not by panicking

/// HTTP/1.1 client implementation.
///
/// Provides GET and POST exchanges with bounded headers, query parameters and
/// bodies, and redirect following for GET.
pub mod http;
