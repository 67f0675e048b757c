// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tool and resource descriptors plus invocation results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ZapError;
use crate::id::ToolId;

/// Side-effect classification for tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// No observable side effects; output depends only on input.
    Pure,
    /// Side effects replay identically under a determinism context.
    Deterministic,
    /// Effects or outputs may differ between invocations.
    #[default]
    Nondeterministic,
}

/// Tool stability level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    /// May change or disappear without notice.
    Experimental,
    /// API shape settled, behavior still maturing.
    Beta,
    /// Covered by compatibility guarantees.
    #[default]
    Stable,
    /// Scheduled for removal.
    Deprecated,
}

/// A discoverable capability in the gateway catalog.
///
/// Well-formed entries keep `effect == Pure ⇒ idempotent == true`; the
/// client carries the fields without enforcing that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Unique identifier.
    pub id: ToolId,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Side-effect classification.
    #[serde(default)]
    pub effect: Effect,
    /// Whether repeated invocations with the same input are safe.
    #[serde(default)]
    pub idempotent: bool,
    /// JSON Schema for the tool's arguments.
    #[serde(default = "empty_object")]
    pub input_schema: Value,
    /// JSON Schema for the tool's output.
    #[serde(default = "empty_object")]
    pub output_schema: Value,
    /// Provider identifier (e.g. an MCP server name).
    #[serde(default)]
    pub provider: String,
    /// Stability level.
    #[serde(default)]
    pub stability: Stability,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Tool {
    /// The tool's bare name (without namespace or version).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.id.name
    }

    /// The canonical `namespace/name@version` form.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.id.to_string()
    }
}

/// Addressable content exposed by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Resource URI.
    pub uri: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// MIME type of the content.
    #[serde(default = "default_mime")]
    pub mime_type: String,
    /// Content size in bytes, when known.
    #[serde(default)]
    pub size: u64,
}

fn default_mime() -> String {
    "text/plain".to_string()
}

/// Result of a tool invocation.
///
/// Success and failure are mutually exclusive by construction: use
/// [`ToolResult::ok`] or [`ToolResult::failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Whether the invocation succeeded.
    pub success: bool,
    /// Result payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ZapError>,
    /// Wall-clock duration of the call in nanoseconds.
    #[serde(default)]
    pub duration_ns: u64,
}

impl ToolResult {
    /// Successful result carrying `data`.
    #[must_use]
    pub fn ok(data: Value, duration_ns: u64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            duration_ns,
        }
    }

    /// Failed result carrying `error`.
    #[must_use]
    pub fn failed(error: ZapError, duration_ns: u64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            duration_ns,
        }
    }
}
