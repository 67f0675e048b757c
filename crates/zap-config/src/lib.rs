// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and defaults for the ZAP client stack.
//!
//! This crate provides [`ZapConfig`] — gateway address, timeouts, tool
//! selection, and consensus defaults — together with helpers for loading
//! from TOML files and producing advisory [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use zap_client::Endpoint;
use zap_core::ConsensusConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found or unreadable.
    #[error("config file not readable: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A timeout is unusually large.
    LargeTimeout {
        /// Which timeout field.
        field: String,
        /// Timeout value in milliseconds.
        ms: u64,
    },
    /// A filter list is present but empty, which selects nothing.
    EmptyFilter {
        /// Which filter field.
        field: String,
    },
}

// ---------------------------------------------------------------------------
// ZapConfig
// ---------------------------------------------------------------------------

/// Runtime settings for a ZAP-connected agent.
///
/// # Examples
///
/// ```
/// let config = zap_config::ZapConfig::from_toml_str(
///     r#"
///     gateway_uri = "zap+tls://gateway.example.com:8443"
///     tool_namespaces = ["native", "mcp.github"]
///     certified_only = true
///     "#,
/// )
/// .unwrap();
/// assert!(config.certified_only);
/// assert_eq!(config.connect_timeout_ms, 5000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ZapConfig {
    /// Gateway address (`zap://`, `zap+tls://`, or `zap+unix://`).
    pub gateway_uri: String,
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Restrict discovered tools to these namespaces, when set.
    pub tool_namespaces: Option<Vec<String>>,
    /// Restrict discovered tools to these name prefixes, when set.
    pub tool_prefixes: Option<Vec<String>>,
    /// Register the canonical tool set alongside discovered tools.
    pub include_canonical: bool,
    /// Only expose tools with stable certification.
    pub certified_only: bool,
    /// Defaults for consensus decisions.
    pub consensus: ConsensusConfig,
}

impl Default for ZapConfig {
    fn default() -> Self {
        Self {
            gateway_uri: "zap://localhost:9999".to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
            tool_namespaces: None,
            tool_prefixes: None,
            include_canonical: true,
            certified_only: false,
            consensus: ConsensusConfig::default(),
        }
    }
}

impl ZapConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ParseError`] for malformed TOML.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })
    }

    /// Load and parse a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::FileNotFound`] when the file is unreadable,
    /// [`ConfigError::ParseError`] for malformed TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// The parsed gateway endpoint.
    ///
    /// # Errors
    ///
    /// `invalidParams` (as a [`zap_core::ZapError`]) for URIs outside the
    /// three ZAP schemes.
    pub fn endpoint(&self) -> Result<Endpoint, zap_core::ZapError> {
        Endpoint::parse(&self.gateway_uri)
    }

    /// Semantic validation.
    ///
    /// Returns advisory warnings on success.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ValidationError`] accumulating every problem found.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        let mut reasons = Vec::new();
        let mut warnings = Vec::new();

        if let Err(e) = self.endpoint() {
            reasons.push(e.to_string());
        }
        if self.connect_timeout_ms == 0 {
            reasons.push("connect_timeout_ms must be positive".to_string());
        }
        if self.request_timeout_ms == 0 {
            reasons.push("request_timeout_ms must be positive".to_string());
        }
        if let Err(e) = self.consensus.validate() {
            reasons.push(e.to_string());
        }

        if self.request_timeout_ms > 600_000 {
            warnings.push(ConfigWarning::LargeTimeout {
                field: "request_timeout_ms".to_string(),
                ms: self.request_timeout_ms,
            });
        }
        if self.connect_timeout_ms > 60_000 {
            warnings.push(ConfigWarning::LargeTimeout {
                field: "connect_timeout_ms".to_string(),
                ms: self.connect_timeout_ms,
            });
        }
        if matches!(&self.tool_namespaces, Some(ns) if ns.is_empty()) {
            warnings.push(ConfigWarning::EmptyFilter {
                field: "tool_namespaces".to_string(),
            });
        }
        if matches!(&self.tool_prefixes, Some(p) if p.is_empty()) {
            warnings.push(ConfigWarning::EmptyFilter {
                field: "tool_prefixes".to_string(),
            });
        }

        if reasons.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigError::ValidationError { reasons })
        }
    }
}
