// SPDX-License-Identifier: MIT OR Apache-2.0
//! Catalog, resource, coordination, and MCP-passthrough surfaces.
//!
//! Every request carries a fresh [`CallContext`] unless the caller supplies
//! one. `call_tool` is the one operation that never returns `Err`: protocol
//! failures come back as failed [`ToolResult`]s so callers can branch on
//! `result.success` uniformly.

use std::time::Instant;

use serde_json::{Value, json};
use zap_core::{
    CallContext, Certificate, ConsensusConfig, ConsensusResult, Resource, Tool, ToolId,
    ToolResult, ZapError, hexstr,
};

use crate::client::ZapClient;

impl ZapClient {
    /// List the gateway tool catalog.
    ///
    /// # Errors
    ///
    /// Surfaces request failures unchanged.
    pub async fn list_tools(&self, certified_only: bool) -> Result<Vec<Tool>, ZapError> {
        let payload = self
            .request(
                "catalog.listTools",
                json!({"certifiedOnly": certified_only, "ctx": self.make_context()}),
                None,
            )
            .await?;
        tools_from(payload.get("tools"))
    }

    /// Fetch a single tool by id; accepts any parsable [`ToolId`] string.
    ///
    /// # Errors
    ///
    /// `invalidParams` for unparsable ids; otherwise surfaces request
    /// failures unchanged.
    pub async fn get_tool(&self, tool_id: &str) -> Result<Tool, ZapError> {
        let tid = ToolId::parse(tool_id)?;
        let payload = self
            .request(
                "catalog.getTool",
                json!({"id": tid, "ctx": self.make_context()}),
                None,
            )
            .await?;
        serde_json::from_value(payload.get("tool").cloned().unwrap_or(Value::Null))
            .map_err(|e| ZapError::protocol_error(format!("malformed tool entry: {e}")))
    }

    /// Full-text search over the catalog.
    ///
    /// # Errors
    ///
    /// Surfaces request failures unchanged.
    pub async fn search_tools(&self, query: &str) -> Result<Vec<Tool>, ZapError> {
        let payload = self
            .request(
                "catalog.search",
                json!({"query": query, "ctx": self.make_context()}),
                None,
            )
            .await?;
        tools_from(payload.get("tools"))
    }

    /// Invoke a tool through the catalog.
    ///
    /// Never fails: timeouts, disconnects, and gateway errors are captured
    /// as `success == false` results with the error attached. `duration_ns`
    /// is wall-clock around the request either way.
    pub async fn call_tool(
        &self,
        name: &str,
        args: Value,
        context: Option<CallContext>,
    ) -> ToolResult {
        let start = Instant::now();
        let tid = match ToolId::parse(name) {
            Ok(tid) => tid,
            Err(e) => return ToolResult::failed(e, start.elapsed().as_nanos() as u64),
        };
        let ctx = context.unwrap_or_else(|| self.make_context());
        let reply = self
            .request(
                "catalog.invoke",
                json!({"id": tid, "args": args, "ctx": ctx}),
                None,
            )
            .await;
        let duration_ns = start.elapsed().as_nanos() as u64;
        match reply {
            Ok(payload) => ToolResult::ok(
                payload.get("result").cloned().unwrap_or(Value::Null),
                duration_ns,
            ),
            Err(err) => ToolResult::failed(err, duration_ns),
        }
    }

    // -- Resources ----------------------------------------------------------

    /// List resources, optionally continuing from an opaque cursor token.
    ///
    /// Returns the page and the next cursor when more pages exist.
    ///
    /// # Errors
    ///
    /// Surfaces request failures unchanged; `protocolError` for malformed
    /// pages.
    pub async fn list_resources(
        &self,
        cursor: Option<&[u8]>,
    ) -> Result<(Vec<Resource>, Option<Vec<u8>>), ZapError> {
        let token = cursor.map(hexstr::to_hex).unwrap_or_default();
        let payload = self
            .request(
                "resources.list",
                json!({"cursor": {"token": token}, "ctx": self.make_context()}),
                None,
            )
            .await?;
        let page = payload.get("page").cloned().unwrap_or_else(|| json!({}));
        let resources: Vec<Resource> =
            serde_json::from_value(page.get("resources").cloned().unwrap_or_else(|| json!([])))
                .map_err(|e| ZapError::protocol_error(format!("malformed resource page: {e}")))?;
        let has_more = page.get("hasMore").and_then(Value::as_bool).unwrap_or(false);
        let next = if has_more {
            match page
                .get("nextCursor")
                .and_then(|c| c.get("token"))
                .and_then(Value::as_str)
            {
                Some(tok) => Some(
                    hexstr::from_hex(tok)
                        .map_err(|e| ZapError::protocol_error(format!("malformed cursor: {e}")))?,
                ),
                None => None,
            }
        } else {
            None
        };
        Ok((resources, next))
    }

    /// Read a resource by URI; returns `(mime_type, bytes)`.
    ///
    /// The gateway sends either a `text` field or a hex `blob`.
    ///
    /// # Errors
    ///
    /// Surfaces request failures unchanged; `protocolError` for undecodable
    /// blobs.
    pub async fn read_resource(&self, uri: &str) -> Result<(String, Vec<u8>), ZapError> {
        let payload = self
            .request(
                "resources.read",
                json!({"uri": uri, "ctx": self.make_context()}),
                None,
            )
            .await?;
        let content = payload.get("content").cloned().unwrap_or_else(|| json!({}));
        let mime = content
            .get("mimeType")
            .and_then(Value::as_str)
            .unwrap_or("text/plain")
            .to_string();
        if let Some(text) = content.get("text").and_then(Value::as_str) {
            return Ok((mime, text.as_bytes().to_vec()));
        }
        if let Some(blob) = content.get("blob").and_then(Value::as_str) {
            let bytes = hexstr::from_hex(blob)
                .map_err(|e| ZapError::protocol_error(format!("malformed blob: {e}")))?;
            return Ok((mime, bytes));
        }
        Ok((mime, Vec::new()))
    }

    // -- Coordination -------------------------------------------------------

    /// Run raw proposal-based consensus on the gateway.
    ///
    /// # Errors
    ///
    /// `invalidParams` for invalid configs; otherwise surfaces request
    /// failures unchanged.
    pub async fn propose_consensus(
        &self,
        topic: &[u8],
        proposal: &[u8],
        config: Option<&ConsensusConfig>,
    ) -> Result<ConsensusResult, ZapError> {
        let default_cfg;
        let cfg = match config {
            Some(cfg) => cfg,
            None => {
                default_cfg = ConsensusConfig::default();
                &default_cfg
            }
        };
        cfg.validate()?;
        let payload = self
            .request(
                "coordination.propose",
                json!({
                    "topic": hexstr::to_hex(topic),
                    "proposal": hexstr::to_hex(proposal),
                    "config": cfg,
                    "ctx": self.make_context()
                }),
                None,
            )
            .await?;
        serde_json::from_value(payload.get("result").cloned().unwrap_or_else(|| json!({})))
            .map_err(|e| ZapError::protocol_error(format!("malformed consensus result: {e}")))
    }

    /// Ask the gateway's committee endpoint for a consensus answer.
    ///
    /// Returns `(answer, certificate)`.
    ///
    /// # Errors
    ///
    /// `invalidParams` for invalid configs; otherwise surfaces request
    /// failures unchanged.
    pub async fn committee_query(
        &self,
        question: &str,
        participants: &[String],
        config: Option<&ConsensusConfig>,
    ) -> Result<(String, Certificate), ZapError> {
        let default_cfg;
        let cfg = match config {
            Some(cfg) => cfg,
            None => {
                default_cfg = ConsensusConfig::default();
                &default_cfg
            }
        };
        cfg.validate()?;
        let payload = self
            .request(
                "coordination.committee",
                json!({
                    "question": question,
                    "participants": participants,
                    "config": cfg,
                    "ctx": self.make_context()
                }),
                None,
            )
            .await?;
        let answer = payload
            .get("answer")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let certificate: Certificate =
            serde_json::from_value(payload.get("certificate").cloned().unwrap_or_else(|| json!({})))
                .map_err(|e| ZapError::protocol_error(format!("malformed certificate: {e}")))?;
        Ok((answer, certificate))
    }

    // -- MCP passthrough ----------------------------------------------------

    /// List tools aggregated from the gateway's connected MCP servers.
    ///
    /// # Errors
    ///
    /// Surfaces request failures unchanged.
    pub async fn list_mcp_tools(&self) -> Result<Vec<Value>, ZapError> {
        let payload = self
            .request(
                "gateway.listMcpTools",
                json!({"ctx": self.make_context()}),
                None,
            )
            .await?;
        Ok(payload
            .get("tools")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Call an MCP tool by name with pre-encoded JSON arguments.
    ///
    /// # Errors
    ///
    /// Surfaces request failures unchanged.
    pub async fn call_mcp_tool(&self, name: &str, json_args: &str) -> Result<String, ZapError> {
        let payload = self
            .request(
                "gateway.callMcpTool",
                json!({"name": name, "jsonArgs": json_args, "ctx": self.make_context()}),
                None,
            )
            .await?;
        Ok(payload
            .get("jsonResult")
            .and_then(Value::as_str)
            .unwrap_or("{}")
            .to_string())
    }

    /// Register an MCP server with the gateway.
    ///
    /// # Errors
    ///
    /// Surfaces request failures unchanged.
    pub async fn register_mcp_server(&self, name: &str, endpoint: &str) -> Result<bool, ZapError> {
        let payload = self
            .request(
                "gateway.registerMcpServer",
                json!({"name": name, "endpoint": endpoint, "ctx": self.make_context()}),
                None,
            )
            .await?;
        Ok(payload
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }
}

fn tools_from(tools: Option<&Value>) -> Result<Vec<Tool>, ZapError> {
    serde_json::from_value(tools.cloned().unwrap_or_else(|| json!([])))
        .map_err(|e| ZapError::protocol_error(format!("malformed tool list: {e}")))
}
