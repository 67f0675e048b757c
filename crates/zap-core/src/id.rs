// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tool identifiers and their canonical string form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ZapError;

/// Default namespace when a tool reference omits one.
pub const DEFAULT_NAMESPACE: &str = "native";

/// Default version when a tool reference omits one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Unique identifier for a ZAP tool.
///
/// Canonical string form is `namespace/name@version`. Parsing fills
/// defaults for the omitted parts: no `@` means version `1.0.0`, no `/`
/// means namespace `native`.
///
/// # Examples
///
/// ```
/// use zap_core::ToolId;
///
/// let id: ToolId = "mcp.github/create_issue@2.0.0".parse().unwrap();
/// assert_eq!(id.namespace, "mcp.github");
/// assert_eq!(id.name, "create_issue");
/// assert_eq!(id.to_string(), "mcp.github/create_issue@2.0.0");
///
/// let bare: ToolId = "fs.read".parse().unwrap();
/// assert_eq!(bare.namespace, "native");
/// assert_eq!(bare.version, "1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolId {
    /// Provider namespace (e.g. `native`, `mcp.github`).
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Tool name within the namespace (dots allowed, e.g. `fs.read`).
    #[serde(default)]
    pub name: String,
    /// Semantic version string.
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

impl ToolId {
    /// Build an id from its three parts.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse `namespace/name@version`, `namespace/name`, or bare `name`.
    ///
    /// # Errors
    ///
    /// Returns `invalidParams` when the name component is empty.
    pub fn parse(s: &str) -> Result<Self, ZapError> {
        let (ns_name, version) = match s.rsplit_once('@') {
            Some((head, version)) => (head, version),
            None => (s, DEFAULT_VERSION),
        };
        let (namespace, name) = match ns_name.split_once('/') {
            Some((namespace, name)) => (namespace, name),
            None => (DEFAULT_NAMESPACE, ns_name),
        };
        if name.is_empty() {
            return Err(ZapError::invalid_params(format!("invalid tool id: {s:?}")));
        }
        Ok(Self::new(namespace, name, version))
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.namespace, self.name, self.version)
    }
}

impl FromStr for ToolId {
    type Err = ZapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full() {
        let id = ToolId::parse("native/fs.read@1.0.0").unwrap();
        assert_eq!(id, ToolId::new("native", "fs.read", "1.0.0"));
    }

    #[test]
    fn parse_without_version() {
        let id = ToolId::parse("native/fs.read").unwrap();
        assert_eq!(id.version, "1.0.0");
    }

    #[test]
    fn parse_without_namespace() {
        let id = ToolId::parse("fs.read").unwrap();
        assert_eq!(id.namespace, "native");
        assert_eq!(id.name, "fs.read");
        assert_eq!(id.version, "1.0.0");
    }

    #[test]
    fn parse_namespaced_without_version() {
        let id = ToolId::parse("mcp.github/create_issue").unwrap();
        assert_eq!(id.namespace, "mcp.github");
        assert_eq!(id.name, "create_issue");
        assert_eq!(id.version, "1.0.0");
    }

    #[test]
    fn display_is_canonical() {
        let id = ToolId::new("mcp.github", "create_issue", "2.0.0");
        assert_eq!(id.to_string(), "mcp.github/create_issue@2.0.0");
    }

    #[test]
    fn display_parse_round_trip() {
        for s in [
            "native/fs.read@1.0.0",
            "mcp.github/create_issue@2.0.0",
            "a/b@2",
        ] {
            let id = ToolId::parse(s).unwrap();
            assert_eq!(ToolId::parse(&id.to_string()).unwrap(), id);
        }
    }

    #[test]
    fn short_version_kept_verbatim() {
        let id = ToolId::parse("a/b@2").unwrap();
        assert_eq!(id.version, "2");
    }

    #[test]
    fn empty_name_rejected() {
        assert!(ToolId::parse("").is_err());
        assert!(ToolId::parse("ns/@1.0.0").is_err());
    }

    #[test]
    fn serde_fills_defaults() {
        let id: ToolId = serde_json::from_str(r#"{"name":"fs.read"}"#).unwrap();
        assert_eq!(id.namespace, "native");
        assert_eq!(id.version, "1.0.0");
    }
}
