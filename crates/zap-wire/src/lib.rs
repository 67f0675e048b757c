// SPDX-License-Identifier: MIT OR Apache-2.0
//! zap-wire
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Wire format for talking to ZAP gateways.
//! Current transport: 4-byte big-endian length prefix + UTF-8 JSON body.
//!
//! The envelope shape (`{type, id, payload}`) and the method-name set form
//! the stable contract; the body encoding behind the prefix could be swapped
//! for a compact binary schema without touching any caller.

pub mod framing;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use zap_core::{ErrorCode, ZapError};

pub use framing::{read_frame, write_frame};

/// Upper bound on a single frame body, guarding the length prefix before
/// any allocation happens.
pub const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

/// Wire protocol message envelope.
///
/// `id` correlates a reply with its request; `type` on a reply is either
/// the original method name (success) or the literal `"error"`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use zap_wire::{FrameCodec, ZapMessage};
///
/// let msg = ZapMessage::new("catalog.listTools", "abc", json!({"certifiedOnly": false}));
/// let bytes = FrameCodec::encode(&msg).unwrap();
/// let body_len = u32::from_be_bytes(bytes[..4].try_into().unwrap()) as usize;
/// assert_eq!(body_len, bytes.len() - 4);
/// assert_eq!(FrameCodec::decode(&bytes[4..]).unwrap(), msg);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZapMessage {
    /// Method name on requests; method name or `"error"` on replies.
    #[serde(rename = "type")]
    pub kind: String,
    /// Correlation id.
    pub id: String,
    /// Message payload; always a JSON object.
    pub payload: Value,
}

impl ZapMessage {
    /// Build a message, asserting nothing about the payload shape yet;
    /// [`FrameCodec::encode`] enforces the object constraint.
    pub fn new(kind: impl Into<String>, id: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            payload,
        }
    }

    /// Whether this message is an error reply.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == "error"
    }
}

/// Errors arising from envelope encoding/decoding or frame I/O.
#[derive(Debug, Error)]
pub enum WireError {
    /// JSON serialization or deserialization failure.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The body is well-formed JSON but not a valid envelope.
    #[error("malformed envelope: {0}")]
    BadEnvelope(String),

    /// The length prefix exceeds [`MAX_FRAME_LEN`].
    #[error("frame of {len} bytes exceeds the frame limit")]
    Oversize {
        /// Declared body length.
        len: u32,
    },

    /// The peer closed the stream mid-frame or between frames.
    #[error("connection closed")]
    ConnectionClosed,
}

impl From<WireError> for ZapError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::ConnectionClosed => ZapError::not_connected("connection closed"),
            other => ZapError::new(ErrorCode::ProtocolError, other.to_string()),
        }
    }
}

/// Stateless codec for the framed envelope encoding.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec;

impl FrameCodec {
    /// Encode a message as a length-prefixed frame.
    ///
    /// The body is UTF-8 JSON with exactly the fields `{type, id, payload}`;
    /// the prefix is the body length as a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::BadEnvelope`] when the payload is not a JSON
    /// object, [`WireError::Oversize`] when the body would exceed the frame
    /// limit.
    pub fn encode(msg: &ZapMessage) -> Result<Vec<u8>, WireError> {
        if !msg.payload.is_object() {
            return Err(WireError::BadEnvelope("payload must be a JSON object".into()));
        }
        let body = serde_json::to_vec(msg)?;
        if body.len() > MAX_FRAME_LEN as usize {
            return Err(WireError::Oversize {
                len: body.len() as u32,
            });
        }
        let mut frame = Vec::with_capacity(4 + body.len());
        frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Decode a frame body (without the length prefix).
    ///
    /// Rejects bodies that are not a JSON object carrying a string `type`,
    /// a string `id`, and an object `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Json`] for unparsable bodies and
    /// [`WireError::BadEnvelope`] for structurally invalid ones.
    pub fn decode(body: &[u8]) -> Result<ZapMessage, WireError> {
        let value: Value = serde_json::from_slice(body)?;
        let obj = value
            .as_object()
            .ok_or_else(|| WireError::BadEnvelope("body is not a JSON object".into()))?;
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| WireError::BadEnvelope("missing string field `type`".into()))?;
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| WireError::BadEnvelope("missing string field `id`".into()))?;
        let payload = obj
            .get("payload")
            .ok_or_else(|| WireError::BadEnvelope("missing field `payload`".into()))?;
        if !payload.is_object() {
            return Err(WireError::BadEnvelope("`payload` is not a JSON object".into()));
        }
        Ok(ZapMessage {
            kind: kind.to_string(),
            id: id.to_string(),
            payload: payload.clone(),
        })
    }
}
