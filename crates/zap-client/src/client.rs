// SPDX-License-Identifier: MIT OR Apache-2.0
//! The multiplexed gateway client.
//!
//! One background receive task per connection routes replies to waiting
//! callers by correlation id; writes are serialized by the connection
//! write lock. The state machine is
//! `disconnected → connecting → ready → closed`, and `closed` is terminal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;
use zap_core::{
    CallContext, EndpointCaps, Hello, PROTOCOL_VERSION, Welcome, ZapError,
    is_compatible_protocol,
};
use zap_wire::{WireError, ZapMessage, read_frame, write_frame};

use crate::transport::{self, BoxedReader, BoxedWriter};
use crate::uri::Endpoint;

/// Default timeout for connection establishment.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type Reply = Result<Value, ZapError>;
type PendingMap = Arc<StdMutex<HashMap<String, oneshot::Sender<Reply>>>>;

/// Shared handles of a live connection. Cheap to clone; the receive loop
/// and every in-flight request hold one.
#[derive(Clone)]
struct ConnHandles {
    writer: Arc<AsyncMutex<BoxedWriter>>,
    pending: PendingMap,
    alive: Arc<AtomicBool>,
}

/// Async client for ZAP gateway connections.
///
/// # Examples
///
/// ```no_run
/// use zap_client::ZapClient;
///
/// # async fn demo() -> Result<(), zap_core::ZapError> {
/// let client = ZapClient::from_uri("zap://localhost:9999")?;
/// let welcome = client.connect().await?;
/// let tools = client.list_tools(false).await?;
/// println!("{} tools behind {}", tools.len(), welcome.endpoint_info.name);
/// client.close().await;
/// # Ok(())
/// # }
/// ```
pub struct ZapClient {
    endpoint: Endpoint,
    connect_timeout: Duration,
    request_timeout: Duration,
    /// Serializes connect/close transitions; requests never take it.
    connect_lock: AsyncMutex<()>,
    conn: RwLock<Option<ConnHandles>>,
    recv_task: StdMutex<Option<JoinHandle<()>>>,
    welcome: RwLock<Option<Welcome>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for ZapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZapClient")
            .field("endpoint", &self.endpoint)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl ZapClient {
    /// Create a disconnected client for `endpoint` with default timeouts.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_lock: AsyncMutex::new(()),
            conn: RwLock::new(None),
            recv_task: StdMutex::new(None),
            welcome: RwLock::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a disconnected client from a ZAP URI.
    ///
    /// # Errors
    ///
    /// `invalidParams` for URIs outside the three ZAP schemes.
    pub fn from_uri(uri: &str) -> Result<Self, ZapError> {
        Ok(Self::new(Endpoint::parse(uri)?))
    }

    /// Override the connect and request timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    /// The endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The per-request fallback timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Whether the connection is up and the receive loop running.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn
            .read()
            .expect("conn lock poisoned")
            .as_ref()
            .is_some_and(|h| h.alive.load(Ordering::SeqCst))
    }

    /// Gateway capabilities from the handshake, if connected at least once.
    #[must_use]
    pub fn capabilities(&self) -> Option<EndpointCaps> {
        self.welcome
            .read()
            .expect("welcome lock poisoned")
            .as_ref()
            .map(|w| w.capabilities.clone())
    }

    /// The cached `Welcome` from the handshake.
    #[must_use]
    pub fn welcome(&self) -> Option<Welcome> {
        self.welcome.read().expect("welcome lock poisoned").clone()
    }

    /// Connect to the gateway and perform the `initialize` handshake.
    ///
    /// Calling `connect` on an already-connected client returns the cached
    /// `Welcome` without touching the wire. Once a session has ended,
    /// whether by [`ZapClient::close`] or by transport failure, the client
    /// is terminally closed and a fresh instance is needed.
    ///
    /// # Errors
    ///
    /// `notConnected` on transport failure or on a terminally closed
    /// client, `protocolError` when the gateway speaks an incompatible
    /// major version.
    pub async fn connect(&self) -> Result<Welcome, ZapError> {
        let _guard = self.connect_lock.lock().await;
        if let Some(welcome) = self.reusable_session()? {
            return Ok(welcome);
        }
        let (reader, writer) = transport::open(&self.endpoint, self.connect_timeout).await?;
        self.start_session(reader, writer).await
    }

    /// Perform the handshake over caller-supplied streams.
    ///
    /// Intended for tests and custom transports; the client takes exclusive
    /// ownership of both halves, exactly as with [`ZapClient::connect`].
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ZapClient::connect`].
    pub async fn connect_io<R, W>(&self, reader: R, writer: W) -> Result<Welcome, ZapError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let _guard = self.connect_lock.lock().await;
        if let Some(welcome) = self.reusable_session()? {
            return Ok(welcome);
        }
        self.start_session(Box::new(reader), Box::new(writer)).await
    }

    /// Decide whether an existing session can serve this `connect` call.
    ///
    /// `Ok(Some(_))` reuses the live session, `Ok(None)` permits a fresh
    /// handshake, and `Err` reports a terminally closed client.
    fn reusable_session(&self) -> Result<Option<Welcome>, ZapError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ZapError::not_connected("client closed"));
        }
        let conn = self.conn.read().expect("conn lock poisoned");
        match conn.as_ref() {
            Some(handles) if handles.alive.load(Ordering::SeqCst) => {
                Ok(self.welcome.read().expect("welcome lock poisoned").clone())
            }
            Some(_) => Err(ZapError::not_connected(
                "connection lost; create a new client",
            )),
            None => Ok(None),
        }
    }

    async fn start_session(
        &self,
        reader: BoxedReader,
        writer: BoxedWriter,
    ) -> Result<Welcome, ZapError> {
        let handles = ConnHandles {
            writer: Arc::new(AsyncMutex::new(writer)),
            pending: Arc::new(StdMutex::new(HashMap::new())),
            alive: Arc::new(AtomicBool::new(true)),
        };
        let task = tokio::spawn(receive_loop(reader, handles.clone()));
        *self.conn.write().expect("conn lock poisoned") = Some(handles.clone());
        *self.recv_task.lock().expect("recv task lock poisoned") = Some(task);

        let hello = serde_json::to_value(Hello::default())
            .map_err(|e| ZapError::internal(format!("hello serialization failed: {e}")))?;
        let welcome_value =
            match request_on(&handles, "initialize", hello, self.request_timeout).await {
                Ok(v) => v,
                Err(e) => {
                    self.teardown().await;
                    return Err(e);
                }
            };
        let welcome: Welcome = match serde_json::from_value(welcome_value) {
            Ok(w) => w,
            Err(e) => {
                self.teardown().await;
                return Err(ZapError::protocol_error(format!("malformed welcome: {e}")));
            }
        };
        if !is_compatible_protocol(&welcome.protocol_version, PROTOCOL_VERSION) {
            self.teardown().await;
            return Err(ZapError::protocol_error(format!(
                "incompatible gateway protocol version {} (client speaks {})",
                welcome.protocol_version, PROTOCOL_VERSION
            )));
        }
        debug!(
            target: "zap.client",
            "handshake complete: gateway={} version={}",
            welcome.endpoint_info.name, welcome.protocol_version
        );
        *self.welcome.write().expect("welcome lock poisoned") = Some(welcome.clone());
        Ok(welcome)
    }

    /// Close the client. Terminal: the receive task stops, the writer shuts
    /// down, and every pending request fails with `notConnected`.
    pub async fn close(&self) {
        let _guard = self.connect_lock.lock().await;
        self.closed.store(true, Ordering::SeqCst);
        self.teardown().await;
    }

    async fn teardown(&self) {
        let task = self.recv_task.lock().expect("recv task lock poisoned").take();
        if let Some(task) = task {
            task.abort();
        }
        let handles = self.conn.write().expect("conn lock poisoned").take();
        if let Some(handles) = handles {
            handles.alive.store(false, Ordering::SeqCst);
            fail_all_pending(&handles.pending, ZapError::not_connected("client closed"));
            let mut writer = handles.writer.lock().await;
            let _ = writer.shutdown().await;
        }
    }

    /// Send `method` with `params` and wait for the correlated reply.
    ///
    /// # Errors
    ///
    /// `notConnected` when disconnected or torn down mid-flight, `timeout`
    /// when the (per-request or default) timeout elapses, and whatever
    /// `ZapError` the gateway replies with.
    pub async fn request(
        &self,
        method: &str,
        params: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, ZapError> {
        let handles = self
            .conn
            .read()
            .expect("conn lock poisoned")
            .clone()
            .ok_or_else(|| ZapError::not_connected("not connected"))?;
        if !handles.alive.load(Ordering::SeqCst) {
            return Err(ZapError::not_connected("connection lost"));
        }
        request_on(
            &handles,
            method,
            params,
            timeout.unwrap_or(self.request_timeout),
        )
        .await
    }

    /// Measure round-trip latency and fetch the server clock.
    ///
    /// Returns `(latency_ns, server_time)`.
    ///
    /// # Errors
    ///
    /// Propagates request failures unchanged.
    pub async fn ping(&self) -> Result<(u64, u64), ZapError> {
        let start = Instant::now();
        let payload = self.request("ping", json!({}), None).await?;
        let latency = start.elapsed().as_nanos() as u64;
        let server_time = payload
            .get("serverTime")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Ok((latency, server_time))
    }

    /// Fresh per-request context derived from the client timeout.
    pub(crate) fn make_context(&self) -> CallContext {
        CallContext::fresh(self.request_timeout)
    }
}

impl Drop for ZapClient {
    fn drop(&mut self) {
        if let Ok(guard) = self.recv_task.get_mut()
            && let Some(task) = guard.take()
        {
            task.abort();
        }
    }
}

/// Issue one request over the given connection handles.
async fn request_on(
    handles: &ConnHandles,
    method: &str,
    params: Value,
    timeout: Duration,
) -> Result<Value, ZapError> {
    let id = Uuid::new_v4().to_string();
    let (tx, rx) = oneshot::channel();
    handles
        .pending
        .lock()
        .expect("pending lock poisoned")
        .insert(id.clone(), tx);

    let msg = ZapMessage::new(method, id.clone(), params);
    {
        let mut writer = handles.writer.lock().await;
        if let Err(e) = write_frame(&mut *writer, &msg).await {
            handles
                .pending
                .lock()
                .expect("pending lock poisoned")
                .remove(&id);
            return Err(match e {
                WireError::Json(_) | WireError::BadEnvelope(_) | WireError::Oversize { .. } => {
                    e.into()
                }
                _ => {
                    handles.alive.store(false, Ordering::SeqCst);
                    ZapError::not_connected(format!("write failed for {method}"))
                }
            });
        }
    }

    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(reply)) => reply,
        // Slot dropped without a reply: the connection was torn down.
        Ok(Err(_)) => Err(ZapError::not_connected("connection closed")),
        Err(_) => {
            handles
                .pending
                .lock()
                .expect("pending lock poisoned")
                .remove(&id);
            Err(ZapError::timeout(format!("request {method} timed out")))
        }
    }
}

/// Background task: route each incoming frame to its pending slot.
///
/// Unknown ids are dropped (a cancelled or timed-out waiter may already be
/// gone). On any read failure the loop ends and every outstanding request
/// fails with `notConnected`.
async fn receive_loop(mut reader: BoxedReader, handles: ConnHandles) {
    loop {
        match read_frame(&mut reader).await {
            Ok(msg) => {
                let slot = handles
                    .pending
                    .lock()
                    .expect("pending lock poisoned")
                    .remove(&msg.id);
                match slot {
                    Some(tx) => {
                        let reply = if msg.is_error() {
                            let err = serde_json::from_value::<ZapError>(msg.payload)
                                .unwrap_or_else(|_| {
                                    ZapError::internal("undecodable error payload")
                                });
                            Err(err)
                        } else {
                            Ok(msg.payload)
                        };
                        let _ = tx.send(reply);
                    }
                    None => {
                        debug!(target: "zap.client", "discarding reply for unknown id={}", msg.id);
                    }
                }
            }
            Err(WireError::ConnectionClosed) => break,
            Err(e) => {
                warn!(target: "zap.client", "receive loop error: {e}");
                break;
            }
        }
    }
    handles.alive.store(false, Ordering::SeqCst);
    fail_all_pending(&handles.pending, ZapError::not_connected("connection closed"));
}

fn fail_all_pending(pending: &PendingMap, err: ZapError) {
    let mut map = pending.lock().expect("pending lock poisoned");
    for (_, tx) in map.drain() {
        let _ = tx.send(Err(err.clone()));
    }
}
