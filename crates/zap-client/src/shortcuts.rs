// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed shortcuts over the canonical tool ids.
//!
//! These wrap `catalog.invoke` on the well-known `native/*` tools so an
//! agent can rely on them before any catalog discovery has happened.
//! Unlike [`ZapClient::call_tool`], a failed result here surfaces as the
//! underlying [`ZapError`].

use std::collections::BTreeMap;

use serde_json::{Value, json};
use zap_core::{ToolResult, ZapError, hexstr};

use crate::client::ZapClient;

impl ZapClient {
    /// Read a file (`native/fs.read`).
    ///
    /// # Errors
    ///
    /// The tool's error when the invocation fails.
    pub async fn fs_read(&self, path: &str, offset: u64, limit: u64) -> Result<Value, ZapError> {
        let result = self
            .call_tool(
                "native/fs.read",
                json!({"path": path, "offset": offset, "limit": limit}),
                None,
            )
            .await;
        into_data(result, "fs.read")
    }

    /// Write a file (`native/fs.write`). Returns the written path.
    ///
    /// # Errors
    ///
    /// The tool's error when the invocation fails.
    pub async fn fs_write(
        &self,
        path: &str,
        content: &str,
        create_dirs: bool,
    ) -> Result<String, ZapError> {
        let result = self
            .call_tool(
                "native/fs.write",
                json!({"path": path, "content": content, "createDirs": create_dirs}),
                None,
            )
            .await;
        let data = into_data(result, "fs.write")?;
        Ok(data
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or(path)
            .to_string())
    }

    /// Find files matching a glob pattern (`native/fs.glob`).
    ///
    /// # Errors
    ///
    /// The tool's error when the invocation fails.
    pub async fn fs_glob(&self, pattern: &str, path: &str) -> Result<Vec<String>, ZapError> {
        let result = self
            .call_tool(
                "native/fs.glob",
                json!({"pattern": pattern, "path": path}),
                None,
            )
            .await;
        let data = into_data(result, "fs.glob")?;
        Ok(data
            .get("paths")
            .and_then(Value::as_array)
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Execute a command (`native/proc.run`).
    ///
    /// # Errors
    ///
    /// The tool's error when the invocation fails.
    pub async fn proc_run(
        &self,
        command: &str,
        args: &[String],
        cwd: Option<&str>,
        timeout_ms: u64,
    ) -> Result<Value, ZapError> {
        let result = self
            .call_tool(
                "native/proc.run",
                json!({
                    "command": command,
                    "args": args,
                    "cwd": cwd.unwrap_or(""),
                    "timeout": timeout_ms
                }),
                None,
            )
            .await;
        into_data(result, "proc.run")
    }

    /// Get version-control status (`native/vcs.status`).
    ///
    /// # Errors
    ///
    /// The tool's error when the invocation fails.
    pub async fn vcs_status(&self) -> Result<Value, ZapError> {
        let result = self.call_tool("native/vcs.status", json!({}), None).await;
        into_data(result, "vcs.status")
    }

    /// Fetch a URL (`native/net.fetch`). The body travels hex-encoded.
    ///
    /// # Errors
    ///
    /// The tool's error when the invocation fails.
    pub async fn net_fetch(
        &self,
        url: &str,
        method: &str,
        headers: &BTreeMap<String, String>,
        body: Option<&[u8]>,
    ) -> Result<Value, ZapError> {
        let header_list: Vec<Value> = headers
            .iter()
            .map(|(name, value)| json!({"name": name, "value": value}))
            .collect();
        let result = self
            .call_tool(
                "native/net.fetch",
                json!({
                    "url": url,
                    "method": method,
                    "headers": header_list,
                    "body": body.map(hexstr::to_hex).unwrap_or_default()
                }),
                None,
            )
            .await;
        into_data(result, "net.fetch")
    }
}

fn into_data(result: ToolResult, op: &str) -> Result<Value, ZapError> {
    if result.success {
        Ok(result.data.unwrap_or(Value::Null))
    } else {
        Err(result
            .error
            .unwrap_or_else(|| ZapError::internal(format!("{op} failed"))))
    }
}
