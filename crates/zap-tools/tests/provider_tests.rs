// SPDX-License-Identifier: MIT OR Apache-2.0
//! Provider discovery, filter semantics, and adapter invoke behavior over
//! the mock gateway.

use std::sync::Arc;

use serde_json::{Value, json};
use zap_client::ZapClient;
use zap_core::ErrorCode;
use zap_mock::{MockGateway, catalog_handler, sample_tools};
use zap_tools::{AgentTool, ToolFilter, ToolProvider};

async fn connected_provider() -> ToolProvider {
    let gateway = MockGateway::new(catalog_handler(sample_tools()));

    let (client_io, server_io) = tokio::io::duplex(65536);
    let (server_read, server_write) = tokio::io::split(server_io);
    gateway.spawn(server_read, server_write);

    let (client_read, client_write) = tokio::io::split(client_io);
    let client = ZapClient::from_uri("zap://mock.local").unwrap();
    client.connect_io(client_read, client_write).await.unwrap();

    let provider = ToolProvider::new(Arc::new(client));
    provider.refresh().await.unwrap();
    provider
}

#[tokio::test]
async fn wildcard_filter_returns_everything() {
    let provider = connected_provider().await;
    let tools = provider.get_tools(&ToolFilter::any()).await.unwrap();
    assert_eq!(tools.len(), 4);
}

#[tokio::test]
async fn namespace_filter_is_exact() {
    let provider = connected_provider().await;
    let tools = provider
        .get_tools(&ToolFilter::any().namespace("mcp.github"))
        .await
        .unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].tool().id.namespace, "mcp.github");

    // `mcp` is not a prefix match on namespaces.
    let none = provider
        .get_tools(&ToolFilter::any().namespace("mcp"))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn prefix_filter_matches_name_start() {
    let provider = connected_provider().await;
    let tools = provider
        .get_tools(&ToolFilter::any().prefix("fs."))
        .await
        .unwrap();
    let mut names: Vec<String> = tools.iter().map(|t| t.tool().id.name.clone()).collect();
    names.sort();
    assert_eq!(names, ["fs.read", "fs.write"]);
}

#[tokio::test]
async fn certified_filter_keeps_stable_only() {
    let provider = connected_provider().await;
    let tools = provider
        .get_tools(&ToolFilter::any().certified_only(true))
        .await
        .unwrap();
    assert_eq!(tools.len(), 2);
    assert!(
        tools
            .iter()
            .all(|t| t.tool().stability == zap_core::Stability::Stable)
    );
}

#[tokio::test]
async fn filters_compose_with_and() {
    let provider = connected_provider().await;
    let tools = provider
        .get_tools(
            &ToolFilter::any()
                .namespace("native")
                .prefix("fs.")
                .certified_only(true),
        )
        .await
        .unwrap();
    assert_eq!(tools.len(), 2);

    let none = provider
        .get_tools(
            &ToolFilter::any()
                .namespace("mcp.github")
                .certified_only(true),
        )
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn repeated_calls_reuse_adapter_instances() {
    let provider = connected_provider().await;
    let first = provider.get_tools(&ToolFilter::any().prefix("fs.read")).await.unwrap();
    let second = provider.get_tools(&ToolFilter::any().prefix("fs.read")).await.unwrap();
    assert_eq!(first.len(), 1);
    assert!(Arc::ptr_eq(&first[0], &second[0]));
}

#[tokio::test]
async fn refresh_swaps_the_snapshot_and_resets_identity() {
    let provider = connected_provider().await;
    let before = provider.get_tool("native/fs.read").await.unwrap();
    provider.refresh().await.unwrap();
    let after = provider.get_tool("native/fs.read").await.unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    // The pre-refresh adapter still works against the live client.
    let reply = before.invoke(r#"{"path": "/tmp/x"}"#).await;
    let parsed: Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(parsed["echo"]["path"], "/tmp/x");
}

#[tokio::test]
async fn get_tool_falls_back_to_the_gateway_and_memoizes() {
    let provider = connected_provider().await;
    provider.disconnect().await;

    // Fresh provider with an empty cache over a new connection.
    let provider = connected_provider().await;
    let adapter = provider.get_tool("create_issue").await;
    // Bare name parses into the native namespace, which has no such tool.
    assert_eq!(adapter.unwrap_err().code, ErrorCode::NotFound);

    let adapter = provider.get_tool("mcp.github/create_issue").await.unwrap();
    assert_eq!(adapter.name(), "create_issue");
}

#[tokio::test]
async fn adapter_exposed_names_replace_dots() {
    let provider = connected_provider().await;
    let adapter = provider.get_tool("native/fs.read").await.unwrap();
    assert_eq!(adapter.name(), "fs_read");
    assert_eq!(adapter.tool().id.name, "fs.read");
}

#[tokio::test]
async fn adapter_schema_is_normalized() {
    let provider = connected_provider().await;
    // The fixture's create_issue schema omits type/required/additionalProperties.
    let adapter = provider.get_tool("mcp.github/create_issue").await.unwrap();
    let schema = adapter.params_schema();
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["required"], json!([]));
    assert_eq!(schema["additionalProperties"], false);
    assert_eq!(schema["properties"]["title"]["type"], "string");
}

#[tokio::test]
async fn invoke_round_trips_through_the_gateway() {
    let provider = connected_provider().await;
    let adapter = provider.get_tool("native/fs.read").await.unwrap();
    let reply = adapter.invoke(r#"{"path": "/etc/hosts"}"#).await;
    let parsed: Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(parsed["echo"]["path"], "/etc/hosts");
    assert_eq!(parsed["tool"], "native/fs.read");
}

#[tokio::test]
async fn invoke_rejects_malformed_json_without_touching_the_wire() {
    let provider = connected_provider().await;
    let adapter = provider.get_tool("native/fs.read").await.unwrap();
    provider.client().close().await;
    // Even with the connection gone, malformed input fails locally first.
    let reply = adapter.invoke("{definitely not json").await;
    assert_eq!(reply, r#"{"error":"Invalid JSON input"}"#);
}

#[tokio::test]
async fn disconnect_clears_caches() {
    let provider = connected_provider().await;
    assert_eq!(provider.get_tools(&ToolFilter::any()).await.unwrap().len(), 4);
    provider.disconnect().await;
    // The catalog is gone and the client is closed, so discovery fails.
    let err = provider.get_tools(&ToolFilter::any()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotConnected);
}
