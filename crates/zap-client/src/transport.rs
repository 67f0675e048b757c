// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transport establishment for the three endpoint schemes.
//!
//! Connections are opened under `connect_timeout` and handed back as boxed
//! split halves; the multiplexer owns both exclusively from then on.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use zap_core::ZapError;

use crate::uri::Endpoint;

/// Read half of an established transport.
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
/// Write half of an established transport.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Open the transport for `endpoint`.
///
/// # Errors
///
/// `notConnected` when the peer is unreachable or the timeout elapses,
/// `invalidParams` for endpoints the platform cannot express.
pub async fn open(
    endpoint: &Endpoint,
    connect_timeout: Duration,
) -> Result<(BoxedReader, BoxedWriter), ZapError> {
    match tokio::time::timeout(connect_timeout, open_inner(endpoint)).await {
        Ok(result) => result,
        Err(_) => Err(ZapError::not_connected(format!(
            "connection timeout to {endpoint}"
        ))),
    }
}

async fn open_inner(endpoint: &Endpoint) -> Result<(BoxedReader, BoxedWriter), ZapError> {
    match endpoint {
        Endpoint::Tcp { host, port } => {
            let stream = TcpStream::connect((host.as_str(), *port))
                .await
                .map_err(|e| ZapError::not_connected(format!("connection failed: {e}")))?;
            let (r, w) = stream.into_split();
            Ok((Box::new(r), Box::new(w)))
        }
        Endpoint::Tls { host, port } => {
            let stream = TcpStream::connect((host.as_str(), *port))
                .await
                .map_err(|e| ZapError::not_connected(format!("connection failed: {e}")))?;
            let server_name = ServerName::try_from(host.clone()).map_err(|_| {
                ZapError::invalid_params(format!("invalid TLS server name: {host}"))
            })?;
            let tls = tls_connector()?
                .connect(server_name, stream)
                .await
                .map_err(|e| ZapError::not_connected(format!("TLS handshake failed: {e}")))?;
            let (r, w) = tokio::io::split(tls);
            Ok((Box::new(r), Box::new(w)))
        }
        Endpoint::Unix { path } => open_unix(path).await,
    }
}

#[cfg(unix)]
async fn open_unix(path: &str) -> Result<(BoxedReader, BoxedWriter), ZapError> {
    let stream = tokio::net::UnixStream::connect(path)
        .await
        .map_err(|e| ZapError::not_connected(format!("connection failed: {e}")))?;
    let (r, w) = stream.into_split();
    Ok((Box::new(r), Box::new(w)))
}

#[cfg(not(unix))]
async fn open_unix(path: &str) -> Result<(BoxedReader, BoxedWriter), ZapError> {
    Err(ZapError::invalid_params(format!(
        "unix sockets are not supported on this platform: {path}"
    )))
}

/// Connector over the system trust store.
fn tls_connector() -> Result<TlsConnector, ZapError> {
    let mut roots = RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    roots.add_parsable_certificates(native.certs);
    if roots.is_empty() {
        return Err(ZapError::not_connected(
            "no usable root certificates in the system trust store",
        ));
    }
    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(TlsConnector::from(Arc::new(config)))
}
