// SPDX-License-Identifier: MIT OR Apache-2.0
//! zap-mock
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! In-process mock gateway for local testing.
//!
//! [`MockGateway`] speaks the framed ZAP wire protocol over any
//! `AsyncRead`/`AsyncWrite` pair (usually one half of
//! `tokio::io::duplex`). It answers `initialize` itself and routes every
//! other method through a handler closure, which can succeed, fail with a
//! protocol error, delay its reply, or stay silent. That is enough to
//! exercise correlation, timeout, and teardown behavior without a real
//! gateway.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;
use zap_core::{Effect, Stability, Tool, ToolId, Welcome, ZapError};
use zap_wire::{ZapMessage, read_frame, write_frame};

/// What the handler wants done with a request.
pub enum MockReply {
    /// Reply immediately with a success payload.
    Success(Value),
    /// Reply immediately with an error envelope.
    Error(ZapError),
    /// Reply with a success payload after the given delay, without
    /// blocking replies to later requests.
    Delayed(Duration, Value),
    /// Never reply (for timeout tests).
    Silence,
}

type Handler = Box<dyn Fn(&str, &Value) -> MockReply + Send + Sync>;

/// A scripted gateway endpoint.
pub struct MockGateway {
    welcome: Welcome,
    handler: Handler,
}

impl MockGateway {
    /// Gateway with a default `Welcome` and the given handler
    /// (`(method, payload) -> reply`).
    pub fn new(handler: impl Fn(&str, &Value) -> MockReply + Send + Sync + 'static) -> Self {
        Self {
            welcome: Welcome {
                instructions: "mock gateway".into(),
                ..Welcome::default()
            },
            handler: Box::new(handler),
        }
    }

    /// Replace the `Welcome` sent for `initialize`.
    #[must_use]
    pub fn with_welcome(mut self, welcome: Welcome) -> Self {
        self.welcome = welcome;
        self
    }

    /// Override just the advertised protocol version.
    #[must_use]
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.welcome.protocol_version = version.into();
        self
    }

    /// Serve the protocol loop until the peer hangs up.
    pub async fn run<R, W>(self, mut reader: R, writer: W)
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer = Arc::new(Mutex::new(writer));
        loop {
            let msg = match read_frame(&mut reader).await {
                Ok(msg) => msg,
                Err(_) => break,
            };

            if msg.kind == "initialize" {
                let payload = serde_json::to_value(&self.welcome).expect("welcome serializes");
                let reply = ZapMessage::new("initialize", msg.id, payload);
                if write_reply(&writer, &reply).await.is_err() {
                    break;
                }
                continue;
            }

            if msg.kind == "ping" {
                let reply = ZapMessage::new("ping", msg.id, json!({"serverTime": 1}));
                if write_reply(&writer, &reply).await.is_err() {
                    break;
                }
                continue;
            }

            match (self.handler)(&msg.kind, &msg.payload) {
                MockReply::Success(payload) => {
                    let reply = ZapMessage::new(msg.kind, msg.id, payload);
                    if write_reply(&writer, &reply).await.is_err() {
                        break;
                    }
                }
                MockReply::Error(err) => {
                    let payload = serde_json::to_value(&err).expect("error serializes");
                    let reply = ZapMessage::new("error", msg.id, payload);
                    if write_reply(&writer, &reply).await.is_err() {
                        break;
                    }
                }
                MockReply::Delayed(delay, payload) => {
                    let writer = Arc::clone(&writer);
                    let reply = ZapMessage::new(msg.kind, msg.id, payload);
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = write_reply(&writer, &reply).await;
                    });
                }
                MockReply::Silence => {
                    debug!(target: "zap.mock", "swallowing request {}", msg.id);
                }
            }
        }
    }

    /// Spawn [`MockGateway::run`] on the current runtime.
    pub fn spawn<R, W>(self, reader: R, writer: W) -> JoinHandle<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        tokio::spawn(self.run(reader, writer))
    }
}

async fn write_reply<W>(
    writer: &Arc<Mutex<W>>,
    reply: &ZapMessage,
) -> Result<(), zap_wire::WireError>
where
    W: AsyncWrite + Send + Unpin,
{
    let mut guard = writer.lock().await;
    write_frame(&mut *guard, reply).await
}

// ---------------------------------------------------------------------------
// Catalog fixture
// ---------------------------------------------------------------------------

/// A small fixed catalog shared by catalog/adapter tests.
#[must_use]
pub fn sample_tools() -> Vec<Tool> {
    vec![
        Tool {
            id: ToolId::new("native", "fs.read", "1.0.0"),
            description: "Read a file from the workspace".into(),
            effect: Effect::Deterministic,
            idempotent: true,
            input_schema: json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"]
            }),
            output_schema: json!({}),
            provider: String::new(),
            stability: Stability::Stable,
        },
        Tool {
            id: ToolId::new("native", "fs.write", "1.0.0"),
            description: "Write a file into the workspace".into(),
            effect: Effect::Nondeterministic,
            idempotent: false,
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "content": {"type": "string"}
                },
                "required": ["path", "content"]
            }),
            output_schema: json!({}),
            provider: String::new(),
            stability: Stability::Stable,
        },
        Tool {
            id: ToolId::new("mcp.github", "create_issue", "2.0.0"),
            description: "Open an issue on a GitHub repository".into(),
            effect: Effect::Nondeterministic,
            idempotent: false,
            input_schema: json!({
                "properties": {
                    "title": {"type": "string"},
                    "body": {"type": "string"}
                }
            }),
            output_schema: json!({}),
            provider: "mcp.github".into(),
            stability: Stability::Beta,
        },
        Tool {
            id: ToolId::new("native", "net.trace", "0.1.0"),
            description: "Experimental route tracing".into(),
            effect: Effect::Nondeterministic,
            idempotent: false,
            input_schema: json!({}),
            output_schema: json!({}),
            provider: String::new(),
            stability: Stability::Experimental,
        },
    ]
}

/// Handler serving the catalog and resource surfaces over [`sample_tools`].
///
/// `catalog.invoke` echoes its arguments back under `result.echo`, except
/// for the id `native/fail.always@1.0.0` which returns `notFound`.
pub fn catalog_handler(
    tools: Vec<Tool>,
) -> impl Fn(&str, &Value) -> MockReply + Send + Sync + 'static {
    move |method, payload| match method {
        "catalog.listTools" => {
            let certified_only = payload["certifiedOnly"].as_bool().unwrap_or(false);
            let listed: Vec<&Tool> = tools
                .iter()
                .filter(|t| !certified_only || t.stability == Stability::Stable)
                .collect();
            MockReply::Success(json!({"tools": listed}))
        }
        "catalog.getTool" => {
            let name = payload["id"]["name"].as_str().unwrap_or_default();
            let namespace = payload["id"]["namespace"].as_str().unwrap_or_default();
            match tools
                .iter()
                .find(|t| t.id.name == name && t.id.namespace == namespace)
            {
                Some(tool) => MockReply::Success(json!({"tool": tool})),
                None => MockReply::Error(ZapError::not_found(format!(
                    "tool {namespace}/{name} not in catalog"
                ))),
            }
        }
        "catalog.search" => {
            let query = payload["query"].as_str().unwrap_or_default().to_lowercase();
            let found: Vec<&Tool> = tools
                .iter()
                .filter(|t| {
                    t.id.name.to_lowercase().contains(&query)
                        || t.description.to_lowercase().contains(&query)
                })
                .collect();
            MockReply::Success(json!({"tools": found}))
        }
        "catalog.invoke" => {
            let name = payload["id"]["name"].as_str().unwrap_or_default();
            if name == "fail.always" {
                return MockReply::Error(ZapError::not_found("tool fail.always not in catalog"));
            }
            MockReply::Success(json!({
                "result": {
                    "echo": payload["args"],
                    "tool": format!(
                        "{}/{}",
                        payload["id"]["namespace"].as_str().unwrap_or_default(),
                        name
                    )
                }
            }))
        }
        "resources.list" => MockReply::Success(json!({
            "page": {
                "resources": [
                    {"uri": "zap://res/readme", "name": "readme", "mimeType": "text/markdown", "size": 24},
                    {"uri": "zap://res/logo", "name": "logo", "mimeType": "image/png", "size": 3}
                ],
                "hasMore": false
            }
        })),
        "resources.read" => {
            let uri = payload["uri"].as_str().unwrap_or_default();
            if uri.ends_with("logo") {
                MockReply::Success(json!({
                    "content": {"mimeType": "image/png", "blob": "89504e"}
                }))
            } else {
                MockReply::Success(json!({
                    "content": {"mimeType": "text/markdown", "text": "# mock gateway\n"}
                }))
            }
        }
        other => MockReply::Error(ZapError::new(
            zap_core::ErrorCode::UnknownAction,
            format!("unknown method: {other}"),
        )),
    }
}
