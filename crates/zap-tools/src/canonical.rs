// SPDX-License-Identifier: MIT OR Apache-2.0
//! The canonical tool set.
//!
//! Hard-coded adapters over the well-known `native/*` tool ids with fixed
//! parameter schemas, so an agent can rely on them before the catalog has
//! been discovered.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use zap_client::ZapClient;

use crate::adapter::{AgentTool, format_result, parse_args};

struct CanonicalTool {
    client: Arc<ZapClient>,
    name: &'static str,
    target: &'static str,
    description: &'static str,
    schema: Value,
}

#[async_trait]
impl AgentTool for CanonicalTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn params_schema(&self) -> &Value {
        &self.schema
    }

    async fn invoke(&self, input_json: &str) -> String {
        let args = match parse_args(input_json) {
            Ok(args) => args,
            Err(reply) => return reply,
        };
        format_result(self.client.call_tool(self.target, args, None).await)
    }
}

/// Adapters for the canonical tool ids, all sharing `client`.
#[must_use]
pub fn canonical_tools(client: &Arc<ZapClient>) -> Vec<Arc<dyn AgentTool>> {
    let spec: [(&'static str, &'static str, &'static str, Value); 6] = [
        (
            "fs_read",
            "native/fs.read",
            "Read a file from the filesystem. Returns content, mime type, and size.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Absolute path to file"},
                    "offset": {
                        "type": "integer",
                        "description": "Line offset to start reading",
                        "default": 0
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum lines to read",
                        "default": 2000
                    }
                },
                "required": ["path"],
                "additionalProperties": false
            }),
        ),
        (
            "fs_write",
            "native/fs.write",
            "Write content to a file. Creates the file if it doesn't exist.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Absolute path to file"},
                    "content": {"type": "string", "description": "Content to write"},
                    "createDirs": {
                        "type": "boolean",
                        "description": "Create parent directories",
                        "default": false
                    }
                },
                "required": ["path", "content"],
                "additionalProperties": false
            }),
        ),
        (
            "fs_glob",
            "native/fs.glob",
            "Find files matching a glob pattern.",
            json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string", "description": "Glob pattern (e.g. '**/*.rs')"},
                    "path": {"type": "string", "description": "Base path to search", "default": "."}
                },
                "required": ["pattern"],
                "additionalProperties": false
            }),
        ),
        (
            "proc_run",
            "native/proc.run",
            "Execute a command. Returns exit code, stdout, and stderr.",
            json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string", "description": "Command to execute"},
                    "args": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Command arguments"
                    },
                    "cwd": {"type": "string", "description": "Working directory"},
                    "timeout": {
                        "type": "integer",
                        "description": "Timeout in milliseconds",
                        "default": 120000
                    }
                },
                "required": ["command"],
                "additionalProperties": false
            }),
        ),
        (
            "vcs_status",
            "native/vcs.status",
            "Get VCS status. Returns branch, staged/modified files, etc.",
            json!({
                "type": "object",
                "properties": {},
                "required": [],
                "additionalProperties": false
            }),
        ),
        (
            "net_fetch",
            "native/net.fetch",
            "Fetch content from a URL. Returns status, headers, and body.",
            json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "URL to fetch"},
                    "method": {"type": "string", "description": "HTTP method", "default": "GET"},
                    "headers": {"type": "object", "description": "Request headers"},
                    "body": {"type": "string", "description": "Request body (hex encoded)"}
                },
                "required": ["url"],
                "additionalProperties": false
            }),
        ),
    ];

    spec.into_iter()
        .map(|(name, target, description, schema)| {
            Arc::new(CanonicalTool {
                client: Arc::clone(client),
                name,
                target,
                description,
                schema,
            }) as Arc<dyn AgentTool>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zap_client::ZapClient;

    fn offline_client() -> Arc<ZapClient> {
        Arc::new(ZapClient::from_uri("zap://mock.local").unwrap())
    }

    #[test]
    fn set_covers_the_six_canonical_ids() {
        let tools = canonical_tools(&offline_client());
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            ["fs_read", "fs_write", "fs_glob", "proc_run", "vcs_status", "net_fetch"]
        );
    }

    #[test]
    fn schemas_are_closed_objects() {
        for tool in canonical_tools(&offline_client()) {
            let schema = tool.params_schema();
            assert_eq!(schema["type"], "object", "{}", tool.name());
            assert_eq!(schema["additionalProperties"], false, "{}", tool.name());
            assert!(schema["required"].is_array(), "{}", tool.name());
        }
    }

    #[test]
    fn fs_read_schema_matches_contract() {
        let tools = canonical_tools(&offline_client());
        let schema = tools[0].params_schema();
        assert_eq!(schema["properties"]["offset"]["default"], 0);
        assert_eq!(schema["properties"]["limit"]["default"], 2000);
        assert_eq!(schema["required"], json!(["path"]));
    }

    #[tokio::test]
    async fn invoke_on_disconnected_client_reports_the_error() {
        let tools = canonical_tools(&offline_client());
        let reply = tools[0].invoke(r#"{"path": "/etc/hosts"}"#).await;
        let parsed: Value = serde_json::from_str(&reply).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("not connected"));
    }
}
