// SPDX-License-Identifier: MIT OR Apache-2.0
//! ZAP endpoint URIs.
//!
//! Exactly three schemes exist:
//!
//! - `zap://host[:port]` — plain TCP
//! - `zap+tls://host[:port]` — TLS over TCP
//! - `zap+unix:///path` — local domain socket
//!
//! Anything else fails with `invalidParams` at parse time.

use std::fmt;
use std::str::FromStr;

use zap_core::ZapError;

/// Default gateway port for the TCP and TLS schemes.
pub const DEFAULT_PORT: u16 = 9999;

/// A parsed gateway address; exactly one transport per value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Plain TCP.
    Tcp {
        /// Remote host name or address.
        host: String,
        /// Remote port.
        port: u16,
    },
    /// TLS over TCP, verified against the system trust store.
    Tls {
        /// Remote host name (also used for certificate verification).
        host: String,
        /// Remote port.
        port: u16,
    },
    /// Local domain socket.
    Unix {
        /// Filesystem path of the socket.
        path: String,
    },
}

impl Endpoint {
    /// Parse a ZAP URI.
    ///
    /// # Examples
    ///
    /// ```
    /// use zap_client::Endpoint;
    ///
    /// let ep = Endpoint::parse("zap://gateway.local").unwrap();
    /// assert_eq!(ep, Endpoint::Tcp { host: "gateway.local".into(), port: 9999 });
    /// assert!(Endpoint::parse("http://example.com").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// `invalidParams` for unknown schemes, empty hosts/paths, and
    /// unparsable ports.
    pub fn parse(uri: &str) -> Result<Self, ZapError> {
        if let Some(path) = uri.strip_prefix("zap+unix://") {
            if path.is_empty() {
                return Err(ZapError::invalid_params(format!(
                    "invalid ZAP URI (empty socket path): {uri}"
                )));
            }
            return Ok(Self::Unix { path: path.into() });
        }
        if let Some(rest) = uri.strip_prefix("zap+tls://") {
            let (host, port) = split_host_port(rest, uri)?;
            return Ok(Self::Tls { host, port });
        }
        if let Some(rest) = uri.strip_prefix("zap://") {
            let (host, port) = split_host_port(rest, uri)?;
            return Ok(Self::Tcp { host, port });
        }
        Err(ZapError::invalid_params(format!("invalid ZAP URI: {uri}")))
    }
}

fn split_host_port(rest: &str, uri: &str) -> Result<(String, u16), ZapError> {
    let (host, port) = match rest.rsplit_once(':') {
        Some((host, port_str)) => {
            let port = port_str.parse::<u16>().map_err(|_| {
                ZapError::invalid_params(format!("invalid port in ZAP URI: {uri}"))
            })?;
            (host, port)
        }
        None => (rest, DEFAULT_PORT),
    };
    if host.is_empty() {
        return Err(ZapError::invalid_params(format!(
            "invalid ZAP URI (empty host): {uri}"
        )));
    }
    Ok((host.to_string(), port))
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } => write!(f, "zap://{host}:{port}"),
            Self::Tls { host, port } => write!(f, "zap+tls://{host}:{port}"),
            Self::Unix { path } => write!(f, "zap+unix://{path}"),
        }
    }
}

impl FromStr for Endpoint {
    type Err = ZapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
