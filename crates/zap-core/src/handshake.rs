// SPDX-License-Identifier: MIT OR Apache-2.0
//! Handshake messages and capability flags.
//!
//! The client opens every connection with a `Hello` and expects a `Welcome`
//! back. Version compatibility is judged on the major component only.

use serde::{Deserialize, Serialize};

use crate::hexstr;
use crate::{CLIENT_NAME, PROTOCOL_VERSION};

/// Client or server implementation info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    /// Implementation name.
    pub name: String,
    /// Implementation version.
    pub version: String,
}

/// Capabilities the client advertises in its `Hello`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCaps {
    /// Client can expose filesystem roots.
    pub roots: bool,
    /// Client can serve sampling requests.
    pub sampling: bool,
    /// Client supports elicitation prompts.
    pub elicitation: bool,
    /// Experimental capability tags.
    #[serde(default)]
    pub experimental: Vec<String>,
}

impl Default for ClientCaps {
    fn default() -> Self {
        Self {
            roots: true,
            sampling: true,
            elicitation: false,
            experimental: Vec::new(),
        }
    }
}

/// Capability flags reported by the gateway.
///
/// Absent flags default to `true` for the core surfaces and `false` for the
/// optional ones, so an old gateway that omits a field still advertises the
/// baseline contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointCaps {
    /// Tool invocation surface.
    #[serde(default = "default_true")]
    pub tools: bool,
    /// Resource listing/reading surface.
    #[serde(default = "default_true")]
    pub resources: bool,
    /// Prompt templates surface.
    #[serde(default = "default_true")]
    pub prompts: bool,
    /// Async task surface.
    #[serde(default = "default_true")]
    pub tasks: bool,
    /// Server-side logging surface.
    #[serde(default = "default_true")]
    pub logging: bool,
    /// Interactive REPL surface.
    #[serde(default)]
    pub repl: bool,
    /// Notebook surface.
    #[serde(default)]
    pub notebook: bool,
    /// Browser automation surface.
    #[serde(default)]
    pub browser: bool,
    /// Tool catalog surface.
    #[serde(default = "default_true")]
    pub catalog: bool,
    /// Consensus coordination surface.
    #[serde(default = "default_true")]
    pub coordination: bool,
    /// Experimental capability tags.
    #[serde(default)]
    pub experimental: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for EndpointCaps {
    fn default() -> Self {
        Self {
            tools: true,
            resources: true,
            prompts: true,
            tasks: true,
            logging: true,
            repl: false,
            notebook: false,
            browser: false,
            catalog: true,
            coordination: true,
            experimental: Vec::new(),
        }
    }
}

/// Client handshake message, sent as the `initialize` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    /// Protocol version the client speaks.
    pub protocol_version: String,
    /// Client implementation info.
    pub client_info: Implementation,
    /// Advertised client capabilities.
    pub capabilities: ClientCaps,
    /// Hash of the schema bundle the client was built against.
    #[serde(default, with = "hexstr")]
    pub schema_hash: Vec<u8>,
}

impl Default for Hello {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            client_info: Implementation {
                name: CLIENT_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ClientCaps::default(),
            schema_hash: Vec::new(),
        }
    }
}

/// Server handshake response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    /// Protocol version the gateway speaks.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    /// Gateway implementation info.
    #[serde(default = "default_endpoint_info")]
    pub endpoint_info: Implementation,
    /// Capability flags.
    #[serde(default)]
    pub capabilities: EndpointCaps,
    /// Free-form usage instructions for the agent.
    #[serde(default)]
    pub instructions: String,
    /// Hash of the schema bundle the gateway serves.
    #[serde(default, with = "hexstr")]
    pub schema_hash: Vec<u8>,
}

impl Default for Welcome {
    fn default() -> Self {
        Self {
            protocol_version: default_protocol_version(),
            endpoint_info: default_endpoint_info(),
            capabilities: EndpointCaps::default(),
            instructions: String::new(),
            schema_hash: Vec::new(),
        }
    }
}

fn default_protocol_version() -> String {
    PROTOCOL_VERSION.to_string()
}

fn default_endpoint_info() -> Implementation {
    Implementation {
        name: "zap-gateway".to_string(),
        version: PROTOCOL_VERSION.to_string(),
    }
}

/// Parse a `MAJOR.MINOR.PATCH` protocol version into its numeric parts.
///
/// A missing patch component defaults to `0`. Returns `None` when the
/// string does not match the expected shape.
#[must_use]
pub fn parse_protocol_version(version: &str) -> Option<(u32, u32, u32)> {
    let mut parts = version.split('.');
    let major = parts.next()?.parse::<u32>().ok()?;
    let minor = parts.next()?.parse::<u32>().ok()?;
    let patch = match parts.next() {
        Some(p) => p.parse::<u32>().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch))
}

/// Two protocol versions are compatible when they share a major component.
///
/// Returns `false` if either string cannot be parsed.
#[must_use]
pub fn is_compatible_protocol(theirs: &str, ours: &str) -> bool {
    match (parse_protocol_version(theirs), parse_protocol_version(ours)) {
        (Some((their_major, _, _)), Some((our_major, _, _))) => their_major == our_major,
        _ => false,
    }
}
