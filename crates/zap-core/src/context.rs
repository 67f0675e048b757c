// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-invocation call context and determinism envelope.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::hexstr;

/// Context attached to every gateway request.
///
/// The wire key for the timeout is `timeout` (milliseconds), matching the
/// gateway contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallContext {
    /// Trace identifier for distributed tracing.
    #[serde(default)]
    pub trace_id: String,
    /// Span identifier within the trace.
    #[serde(default)]
    pub span_id: String,
    /// Request timeout in milliseconds.
    #[serde(rename = "timeout", default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Replay context for deterministic execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub determinism: Option<DeterminismContext>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl CallContext {
    /// Fresh context with random trace/span ids and the given timeout.
    #[must_use]
    pub fn fresh(timeout: Duration) -> Self {
        let span: String = Uuid::new_v4().to_string().chars().take(16).collect();
        Self {
            trace_id: Uuid::new_v4().to_string(),
            span_id: span,
            timeout_ms: timeout.as_millis() as u64,
            determinism: None,
        }
    }
}

/// Inputs pinned for replayable execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeterminismContext {
    /// Fixed logical timestamp.
    #[serde(default)]
    pub timestamp: u64,
    /// Seed for any randomness the tool consumes.
    #[serde(default, with = "hexstr")]
    pub random_seed: Vec<u8>,
    /// Chain height the execution is pinned to.
    #[serde(default)]
    pub chain_height: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_populates_ids() {
        let ctx = CallContext::fresh(Duration::from_secs(30));
        assert_eq!(ctx.trace_id.len(), 36);
        assert_eq!(ctx.span_id.len(), 16);
        assert_eq!(ctx.timeout_ms, 30_000);
        assert!(ctx.determinism.is_none());
    }

    #[test]
    fn wire_key_is_timeout() {
        let ctx = CallContext {
            trace_id: "t1".into(),
            span_id: "s1".into(),
            timeout_ms: 3_000,
            determinism: None,
        };
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["traceId"], "t1");
        assert_eq!(value["spanId"], "s1");
        assert_eq!(value["timeout"], 3_000);
    }

    #[test]
    fn determinism_seed_is_hex_on_the_wire() {
        let ctx = CallContext {
            determinism: Some(DeterminismContext {
                timestamp: 7,
                random_seed: vec![0xab, 0xcd],
                chain_height: 42,
            }),
            ..CallContext::default()
        };
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["determinism"]["randomSeed"], "abcd");
        assert_eq!(value["determinism"]["chainHeight"], 42);
    }
}
