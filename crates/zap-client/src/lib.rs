// SPDX-License-Identifier: MIT OR Apache-2.0
//! zap-client
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Async multiplexed client for ZAP gateways.
//!
//! The client opens one connection (TCP, TLS, or Unix socket, selected by
//! URI scheme), performs the `initialize` handshake, and then serves any
//! number of concurrent requests over it: a single background task reads
//! frames and completes waiters by correlation id, so no ordering is
//! promised between different calls. Catalog, resource, coordination, and
//! MCP-passthrough surfaces all ride on [`ZapClient::request`].

mod catalog;
mod client;
mod shortcuts;
/// Transport establishment for the three endpoint schemes.
pub mod transport;
/// ZAP endpoint URIs.
pub mod uri;

pub use client::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, ZapClient};
pub use uri::{DEFAULT_PORT, Endpoint};
