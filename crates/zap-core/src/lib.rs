// SPDX-License-Identifier: MIT OR Apache-2.0
//! zap-core
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! The stable contract for the ZAP client stack.
//!
//! Everything that crosses the wire lives here: tool descriptors, call
//! contexts, results, handshake messages, and consensus records, together
//! with the single error taxonomy every layer speaks.

/// Per-invocation call context and determinism envelope.
pub mod context;
/// The stable error code set and the [`ZapError`] carrier.
pub mod error;
/// Handshake messages and capability flags.
pub mod handshake;
/// Hex boundary between wire strings and byte payloads.
pub mod hexstr;
/// Tool identifiers and their canonical string form.
pub mod id;
/// Consensus configuration, votes, and certificates.
pub mod consensus;
/// Tool and resource descriptors plus invocation results.
pub mod tool;

pub use context::{CallContext, DeterminismContext};
pub use error::{ErrorCode, ZapError};
pub use handshake::{
    ClientCaps, EndpointCaps, Hello, Implementation, Welcome, is_compatible_protocol,
    parse_protocol_version,
};
pub use id::ToolId;
pub use consensus::{
    Attestor, Certificate, ConsensusConfig, ConsensusResult, ConsensusVote,
};
pub use tool::{Effect, Resource, Stability, Tool, ToolResult};

/// Protocol version spoken by this client.
///
/// # Examples
///
/// ```
/// assert_eq!(zap_core::PROTOCOL_VERSION, "0.2.1");
/// ```
pub const PROTOCOL_VERSION: &str = "0.2.1";

/// Implementation name advertised in the `Hello` handshake.
pub const CLIENT_NAME: &str = "zap-agent";
