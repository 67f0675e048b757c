// SPDX-License-Identifier: MIT OR Apache-2.0
//! The runtime-facing tool seam and the remote adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use zap_client::ZapClient;
use zap_core::{Tool, ToolResult};

/// A callable capability as the agent runtime sees it.
///
/// Invocation is string-in/string-out so the host can hand the payload to
/// the model verbatim: malformed input and remote failures both come back
/// as a JSON `{"error": ...}` string rather than an `Err`.
#[async_trait]
pub trait AgentTool: Send + Sync {
    /// Exposed tool name (runtime-safe, no dots).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments.
    fn params_schema(&self) -> &Value;

    /// Invoke with a JSON-encoded argument string.
    async fn invoke(&self, input_json: &str) -> String;
}

/// A catalog [`Tool`] wrapped as an [`AgentTool`].
///
/// The exposed name replaces `.` with `_` (runtimes often reject dotted
/// identifiers in tool namespaces) and the parameter schema is normalized
/// with [`normalize_schema`].
pub struct RemoteTool {
    client: Arc<ZapClient>,
    tool: Tool,
    exposed_name: String,
    schema: Value,
}

impl RemoteTool {
    /// Wrap `tool`, invoking it through `client`.
    #[must_use]
    pub fn new(client: Arc<ZapClient>, tool: Tool) -> Self {
        let exposed_name = tool.id.name.replace('.', "_");
        let schema = normalize_schema(&tool.input_schema);
        Self {
            client,
            tool,
            exposed_name,
            schema,
        }
    }

    /// The wrapped catalog entry.
    #[must_use]
    pub fn tool(&self) -> &Tool {
        &self.tool
    }
}

#[async_trait]
impl AgentTool for RemoteTool {
    fn name(&self) -> &str {
        &self.exposed_name
    }

    fn description(&self) -> &str {
        &self.tool.description
    }

    fn params_schema(&self) -> &Value {
        &self.schema
    }

    async fn invoke(&self, input_json: &str) -> String {
        let args = match parse_args(input_json) {
            Ok(args) => args,
            Err(reply) => return reply,
        };
        let result = self.client.call_tool(&self.tool.full_name(), args, None).await;
        format_result(result)
    }
}

impl std::fmt::Debug for RemoteTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteTool")
            .field("name", &self.exposed_name)
            .field("id", &self.tool.full_name())
            .finish_non_exhaustive()
    }
}

/// Parse an invocation input string; empty input means no arguments.
pub(crate) fn parse_args(input_json: &str) -> Result<Value, String> {
    if input_json.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(input_json)
        .map_err(|_| json!({"error": "Invalid JSON input"}).to_string())
}

/// Render a [`ToolResult`] for the host runtime.
///
/// String data comes back verbatim; any other payload is JSON-serialized;
/// failures collapse to `{"error": "<message>"}`.
#[must_use]
pub fn format_result(result: ToolResult) -> String {
    if result.success {
        match result.data {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => Value::Null.to_string(),
        }
    } else {
        let message = result
            .error
            .map(|e| e.message)
            .unwrap_or_else(|| "Unknown error".to_string());
        json!({"error": message}).to_string()
    }
}

/// Fill JSON-Schema defaults for a tool's input schema.
///
/// Catalog schemas are already JSON-Schema shaped; absent fields default to
/// `type=object, properties={}, required=[], additionalProperties=false`.
/// Anything that is not an object is replaced by the empty-object schema.
#[must_use]
pub fn normalize_schema(schema: &Value) -> Value {
    let mut map = match schema.as_object() {
        Some(map) => map.clone(),
        None => serde_json::Map::new(),
    };
    map.entry("type").or_insert_with(|| json!("object"));
    map.entry("properties").or_insert_with(|| json!({}));
    map.entry("required").or_insert_with(|| json!([]));
    map.entry("additionalProperties").or_insert_with(|| json!(false));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zap_core::{ErrorCode, ZapError};

    #[test]
    fn normalize_fills_all_defaults_for_empty_schema() {
        let normalized = normalize_schema(&json!({}));
        assert_eq!(
            normalized,
            json!({
                "type": "object",
                "properties": {},
                "required": [],
                "additionalProperties": false
            })
        );
        assert_eq!(normalize_schema(&Value::Null), normalized);
    }

    #[test]
    fn normalize_keeps_existing_fields() {
        let schema = json!({
            "type": "object",
            "properties": {"path": {"type": "string"}},
            "required": ["path"]
        });
        let normalized = normalize_schema(&schema);
        assert_eq!(normalized["properties"]["path"]["type"], "string");
        assert_eq!(normalized["required"], json!(["path"]));
        assert_eq!(normalized["additionalProperties"], json!(false));
    }

    #[test]
    fn format_string_data_verbatim() {
        let result = ToolResult::ok(json!("already text"), 10);
        assert_eq!(format_result(result), "already text");
    }

    #[test]
    fn format_object_data_as_json() {
        let result = ToolResult::ok(json!({"n": 1}), 10);
        assert_eq!(format_result(result), r#"{"n":1}"#);
    }

    #[test]
    fn format_failure_as_error_object() {
        let result = ToolResult::failed(
            ZapError::new(ErrorCode::PermissionDenied, "read denied"),
            10,
        );
        assert_eq!(format_result(result), r#"{"error":"read denied"}"#);
    }

    #[test]
    fn malformed_input_is_rejected_locally() {
        assert_eq!(
            parse_args("{not json").unwrap_err(),
            r#"{"error":"Invalid JSON input"}"#
        );
        assert_eq!(parse_args("").unwrap(), json!({}));
        assert_eq!(parse_args("   ").unwrap(), json!({}));
    }
}
