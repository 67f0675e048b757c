// SPDX-License-Identifier: MIT OR Apache-2.0
//! The stable error code set and the [`ZapError`] carrier.
//!
//! One taxonomy covers every wire-level failure; locally derived failures
//! (bad URIs, closed clients, timeouts, malformed frames) map onto the same
//! closed code set so callers branch on `code` alone.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Machine-readable, stable error code.
///
/// Serialises to the camelCase string the gateway uses on the wire. The set
/// is closed: servers and clients never invent new codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    /// The requested method does not exist on the endpoint.
    UnknownAction,
    /// Request parameters failed validation.
    InvalidParams,
    /// The referenced entity does not exist.
    NotFound,
    /// The operation conflicts with current server state.
    Conflict,
    /// The caller is not allowed to perform the operation.
    PermissionDenied,
    /// The operation did not complete in time.
    Timeout,
    /// Unexpected server-side failure.
    #[default]
    InternalError,
    /// The caller is sending requests too quickly.
    RateLimited,
    /// The client is not connected (or the connection died).
    NotConnected,
    /// A wire-level invariant was violated.
    ProtocolError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnknownAction => "unknownAction",
            Self::InvalidParams => "invalidParams",
            Self::NotFound => "notFound",
            Self::Conflict => "conflict",
            Self::PermissionDenied => "permissionDenied",
            Self::Timeout => "timeout",
            Self::InternalError => "internalError",
            Self::RateLimited => "rateLimited",
            Self::NotConnected => "notConnected",
            Self::ProtocolError => "protocolError",
        };
        f.write_str(s)
    }
}

/// Protocol error as carried on the wire and surfaced to callers.
///
/// # Examples
///
/// ```
/// use zap_core::{ErrorCode, ZapError};
///
/// let err = ZapError::not_found("tool native/fs.read@9.9.9");
/// assert_eq!(err.code, ErrorCode::NotFound);
/// assert_eq!(err.to_string(), "notFound: tool native/fs.read@9.9.9");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ZapError {
    /// Stable error code.
    #[serde(default)]
    pub code: ErrorCode,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Optional opaque detail payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ZapError {
    /// Create an error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach an opaque detail payload.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// `invalidParams` — malformed user input or URI.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    /// `notFound` — missing entity.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// `timeout` — the request or connect attempt timed out.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message)
    }

    /// `notConnected` — uninitialized, closed, or torn-down connection.
    pub fn not_connected(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotConnected, message)
    }

    /// `protocolError` — malformed frame or incompatible version.
    pub fn protocol_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProtocolError, message)
    }

    /// `internalError` — unexpected failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn code_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::PermissionDenied).unwrap(),
            "\"permissionDenied\""
        );
        assert_eq!(
            serde_json::from_str::<ErrorCode>("\"rateLimited\"").unwrap(),
            ErrorCode::RateLimited
        );
    }

    #[test]
    fn display_matches_wire_form() {
        for code in [
            ErrorCode::UnknownAction,
            ErrorCode::InvalidParams,
            ErrorCode::NotFound,
            ErrorCode::Conflict,
            ErrorCode::PermissionDenied,
            ErrorCode::Timeout,
            ErrorCode::InternalError,
            ErrorCode::RateLimited,
            ErrorCode::NotConnected,
            ErrorCode::ProtocolError,
        ] {
            let wire = serde_json::to_value(code).unwrap();
            assert_eq!(wire, json!(code.to_string()));
        }
    }

    #[test]
    fn error_round_trips_with_details() {
        let err = ZapError::invalid_params("bad path").with_details(json!({"path": "/bad"}));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "invalidParams");
        assert_eq!(value["details"]["path"], "/bad");
        let back: ZapError = serde_json::from_value(value).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn missing_code_defaults_to_internal() {
        let err: ZapError = serde_json::from_str(r#"{"message":"boom"}"#).unwrap();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn details_omitted_when_absent() {
        let json = serde_json::to_string(&ZapError::timeout("slow")).unwrap();
        assert!(!json.contains("details"));
    }
}
