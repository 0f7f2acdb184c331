//! Client connection state machine
//!
//! # Architecture
//!
//! ```text
//!  caller ──connect()──┐                       ┌── keep-alive task ──┐
//!  caller ─disconnect()┤                       │  check_liveness()   │
//!                      ▼                       ▼                     │
//!              ┌───────────────────────────────────────┐             │
//!              │  state lock (parking_lot::Mutex)      │ <───────────┘
//!              │  state, generation, endpoint, socket, │
//!              │  protocols, ping interval, keep-alive │
//!              └───────────────────────────────────────┘
//!                      ▲                       ▲
//!        connect task ─┘                       └─ receive task ──> EventBus
//!        (socket open)                            (FrameReceiver,     │
//!                                                  dispatch)          ▼
//!                                                                subscribers
//! ```
//!
//! Every transition happens under one lock. Each `connect` bumps the attempt
//! generation; a completion whose generation no longer matches, or that
//! finds the attempt torn down, drops its result instead of acting on it.
//!
//! In-flight socket work (connect, receive task, writer task, an open
//! handshake) is counted through [`PendingOp`] guards. `connect` waits for
//! the count to reach zero before reusing the connection.

use crate::core::config::ConnectionConfig;
use crate::core::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics};
use crate::core::events::{ConnectionEvent, ConnectionId, DisconnectReason, EventBus, EventReceiver};
use crate::core::frame::{Decoded, FrameReceiver};
use crate::core::keep_alive::{KeepAliveMonitor, LivenessClock};
use crate::core::type_map::{TypeEntry, TypeMap};
use crate::traits::*;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Yields before `connect` falls back to sleeping while ops drain
const DRAIN_SPIN_LIMIT: u32 = 64;

/// One in-flight asynchronous socket operation
///
/// Increments the shared counter on creation and decrements it on drop, so
/// the count cannot go negative or leak on early returns and task aborts.
struct PendingOp(Arc<AtomicUsize>);

impl PendingOp {
    fn begin(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        PendingOp(Arc::clone(counter))
    }
}

impl Drop for PendingOp {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// The live socket: outbound queue plus the two I/O tasks
struct SocketHandle {
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl SocketHandle {
    /// Release the socket
    ///
    /// Graceful close lets the writer flush what is queued and shut the
    /// write half down, aborting it if that takes longer than
    /// `flush_timeout`; otherwise both tasks are aborted.
    fn close(self, graceful: bool, runtime: &Handle, flush_timeout: Duration) {
        self.reader.abort();
        if !graceful {
            self.writer.abort();
            return;
        }

        drop(self.outbound);
        let mut writer = self.writer;
        runtime.spawn(async move {
            if tokio::time::timeout(flush_timeout, &mut writer).await.is_err() {
                warn!("Flush on close exceeded {:?}, dropping queued frames", flush_timeout);
                writer.abort();
            }
        });
    }
}

/// Everything guarded by the state lock
struct Inner {
    state: ConnectionState,
    generation: u64,
    remote_endpoint: Option<String>,
    socket: Option<SocketHandle>,
    protocols: ProtocolSet,
    ping_interval: Duration,
    keep_alive: KeepAliveMonitor,
    /// Held from socket connect until the peer's Connected arrives
    handshake_op: Option<PendingOp>,
    /// Type ids whose definitions this session's peer has been sent
    announced_types: HashSet<u32>,
}

impl Inner {
    /// Whether `generation` is the attempt that currently owns the socket
    fn owns_socket(&self, generation: u64) -> bool {
        self.generation == generation && self.socket.is_some()
    }
}

struct Shared<C: MessageCodec> {
    id: ConnectionId,
    config: ConnectionConfig<C>,
    inner: Mutex<Inner>,
    state: AtomicConnectionState,
    pending_ops: Arc<AtomicUsize>,
    liveness: LivenessClock,
    metrics: AtomicMetrics,
    events: EventBus<C::Message>,
}

/// Client side of a reliable, message-framed connection
///
/// # Lifecycle
///
/// ```text
///            connect()               peer Connected
/// Disconnected ──────> Connecting ───────────────> Connected
///      ▲                   │                           │
///      │  connect error    │    disconnect / socket error / protocol
///      └───────────────────┴──── error / keep-alive timeout
/// ```
///
/// Outcomes arrive as [`ConnectionEvent`]s on every subscriber.
///
/// # Example
///
/// ```ignore
/// let connection = linkwire::builder()
///     .codec(JsonCodec::new())
///     .protocols([Protocol::new(1, 1)])
///     .build()?;
///
/// let events = connection.subscribe();
/// connection.connect("127.0.0.1:4000", MessageTypes::RELIABLE).await?;
///
/// while let Some(event) = events.recv() {
///     println!("{:?}", event);
/// }
/// ```
pub struct ClientConnection<C: MessageCodec> {
    shared: Arc<Shared<C>>,
}

impl<C: MessageCodec> ClientConnection<C> {
    /// Create a connection from configuration
    ///
    /// Use `linkwire::builder()` to create one.
    pub(crate) fn new(config: ConnectionConfig<C>) -> Self {
        let protocols = config.protocols.clone();
        let shared = Shared {
            id: ConnectionId::next(),
            config,
            inner: Mutex::new(Inner {
                state: ConnectionState::Disconnected,
                generation: 0,
                remote_endpoint: None,
                socket: None,
                protocols,
                ping_interval: Duration::ZERO,
                keep_alive: KeepAliveMonitor::new(),
                handshake_op: None,
                announced_types: HashSet::new(),
            }),
            state: AtomicConnectionState::new(ConnectionState::Disconnected),
            pending_ops: Arc::new(AtomicUsize::new(0)),
            liveness: LivenessClock::new(),
            metrics: AtomicMetrics::new(),
            events: EventBus::new(),
        };

        Self {
            shared: Arc::new(shared),
        }
    }

    /// Start connecting to `endpoint` (`host:port`)
    ///
    /// Returns once the attempt is under way; the outcome is published as
    /// `Connected` or `ConnectionFailed`. Waits first for operations left
    /// over from a previous session to finish.
    ///
    /// # Errors
    /// * `InvalidArgument` - `endpoint` is empty
    /// * `NotSupported` - unreliable delivery was requested
    /// * `InvalidOperation` - the connection is not disconnected
    pub async fn connect(&self, endpoint: impl Into<String>, message_types: MessageTypes) -> Result<()> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(LinkError::InvalidArgument("endpoint is empty".into()));
        }
        if message_types.contains(MessageTypes::UNRELIABLE) {
            return Err(LinkError::NotSupported(
                "unreliable delivery is not offered by the TCP transport".into(),
            ));
        }

        // A live session keeps ops pending forever; refuse before waiting on them
        if !self.shared.state.is_disconnected() {
            return Err(LinkError::InvalidOperation(format!(
                "connection is {}",
                self.shared.state.get()
            )));
        }

        self.shared.drain_pending_ops().await;

        let shared = &self.shared;
        let mut inner = shared.inner.lock();
        if inner.state != ConnectionState::Disconnected {
            return Err(LinkError::InvalidOperation(format!("connection is {}", inner.state)));
        }

        inner.generation += 1;
        let generation = inner.generation;
        inner.remote_endpoint = Some(endpoint.clone());
        shared.set_state(&mut inner, ConnectionState::Connecting);
        shared.metrics.increment_connect_attempts();

        info!("[{}] Connecting to {}", shared.id, endpoint);

        let op = PendingOp::begin(&shared.pending_ops);
        let task_shared = Arc::clone(shared);
        shared.config.runtime.spawn(async move {
            task_shared.complete_connect(generation, endpoint, op).await;
        });

        Ok(())
    }

    /// Tear the connection down
    ///
    /// Idempotent: on a disconnected connection nothing happens and no event
    /// is published.
    ///
    /// # Returns
    /// `true` if a session was torn down
    pub fn disconnect(&self, graceful: bool, reason: DisconnectReason) -> bool {
        let mut inner = self.shared.inner.lock();
        self.shared.teardown_locked(&mut inner, reason, graceful)
    }

    /// Queue a message for the peer
    ///
    /// # Errors
    /// * `InvalidOperation` - not connected
    /// * `Codec` - the message could not be encoded
    pub fn send(&self, message: &C::Message) -> Result<()> {
        let inner = self.shared.inner.lock();
        self.shared.require_connected(&inner)?;
        self.shared.queue(&inner, message)
    }

    /// Queue a message whose payload references application types
    ///
    /// Each name is resolved in the connection's type map. Ids the peer of
    /// the current session has not been told about yet are announced with
    /// the codec's type-definition message, queued right before `message`.
    /// Announcements are tracked per session, so a reconnect or a type map
    /// shared with other connections still announces every id before its
    /// first use on this socket.
    ///
    /// # Errors
    /// * `InvalidArgument` - a type name is empty
    /// * `InvalidOperation` - not connected
    /// * `NotSupported` - ids need announcing but the codec has no
    ///   type-definition message
    pub fn send_with_types(&self, message: &C::Message, type_names: &[&str]) -> Result<()> {
        if type_names.iter().any(|name| name.is_empty()) {
            return Err(LinkError::InvalidArgument("type name is empty".into()));
        }

        let mut inner = self.shared.inner.lock();
        self.shared.require_connected(&inner)?;

        let type_map = &self.shared.config.type_map;
        let mut pending: Vec<TypeEntry> = Vec::new();
        for name in type_names {
            let (id, _) = type_map.resolve_id(name)?;
            if !inner.announced_types.contains(&id) && pending.iter().all(|entry| entry.id != id) {
                pending.push(TypeEntry {
                    name: Arc::from(*name),
                    id,
                });
            }
        }

        if !pending.is_empty() {
            pending.sort_by_key(|entry| entry.id);
            let definitions = self.shared.config.codec.type_definitions(&pending).ok_or_else(|| {
                LinkError::NotSupported("codec cannot announce type definitions".into())
            })?;
            debug!("[{}] Announcing {} type ids", self.shared.id, pending.len());
            self.shared.queue(&inner, &definitions)?;
            inner
                .announced_types
                .extend(pending.iter().map(|entry| entry.id));
            // Flushed to a peer at least once
            type_map.drain_new_entries();
        }

        self.shared.queue(&inner, message)
    }

    /// Register a new event subscriber
    pub fn subscribe(&self) -> EventReceiver<C::Message> {
        self.shared.events.subscribe()
    }

    pub fn id(&self) -> ConnectionId {
        self.shared.id
    }

    /// Get current connection state
    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.shared.state.get()
    }

    /// Check if connected
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.shared.state.is_connected()
    }

    pub fn remote_endpoint(&self) -> Option<String> {
        self.shared.inner.lock().remote_endpoint.clone()
    }

    /// Protocols in effect: the offered set until the handshake narrows it
    pub fn protocols(&self) -> Vec<Protocol> {
        self.shared.inner.lock().protocols.values().copied().collect()
    }

    /// Keep-alive interval last announced by the peer, zero when none
    pub fn ping_interval(&self) -> Duration {
        self.shared.inner.lock().ping_interval
    }

    pub fn is_keep_alive_armed(&self) -> bool {
        self.shared.inner.lock().keep_alive.is_armed()
    }

    /// In-flight socket operations
    pub fn pending_operations(&self) -> usize {
        self.shared.pending_ops.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> Metrics {
        self.shared.metrics.snapshot(self.state())
    }

    pub fn type_map(&self) -> &Arc<TypeMap> {
        &self.shared.config.type_map
    }

    pub fn config(&self) -> &ConnectionConfig<C> {
        &self.shared.config
    }
}

impl<C: MessageCodec> Drop for ClientConnection<C> {
    fn drop(&mut self) {
        let mut inner = self.shared.inner.lock();
        self.shared
            .teardown_locked(&mut inner, DisconnectReason::Requested, false);
    }
}

impl<C: MessageCodec> Shared<C> {
    fn set_state(&self, inner: &mut Inner, state: ConnectionState) {
        inner.state = state;
        self.state.set(state);
    }

    async fn drain_pending_ops(&self) {
        let mut spins = 0u32;
        while self.pending_ops.load(Ordering::Acquire) > 0 {
            if spins < DRAIN_SPIN_LIMIT {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            spins = spins.saturating_add(1);
        }
    }

    fn require_connected(&self, inner: &Inner) -> Result<()> {
        if inner.state != ConnectionState::Connected {
            return Err(LinkError::InvalidOperation(format!(
                "cannot send while {}",
                inner.state
            )));
        }
        Ok(())
    }

    /// Encode `message` and hand it to the writer task
    fn queue(&self, inner: &Inner, message: &C::Message) -> Result<()> {
        let socket = inner
            .socket
            .as_ref()
            .ok_or_else(|| LinkError::InvalidOperation("no socket".into()))?;

        let mut frame = Vec::new();
        self.config.codec.encode(message, &mut frame)?;
        socket
            .outbound
            .send(frame)
            .map_err(|e| LinkError::ChannelSend(e.to_string()))?;
        self.metrics.increment_sent();
        Ok(())
    }

    /// Socket connect completion
    async fn complete_connect(self: Arc<Self>, generation: u64, endpoint: String, op: PendingOp) {
        let attempt = tokio::time::timeout(
            self.config.connect_timeout,
            self.config.connector.connect(&endpoint),
        )
        .await;

        let stream = match attempt {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                self.fail_connect(generation, &endpoint, LinkError::Io(e));
                return;
            }
            Err(_) => {
                let timeout = LinkError::Timeout(format!("connect after {:?}", self.config.connect_timeout));
                self.fail_connect(generation, &endpoint, timeout);
                return;
            }
        };

        self.start_session(generation, stream, op);
    }

    fn fail_connect(&self, generation: u64, endpoint: &str, error: LinkError) {
        let mut inner = self.inner.lock();
        if inner.generation != generation || inner.state != ConnectionState::Connecting {
            debug!("[{}] Discarding stale connect failure: {}", self.id, error);
            return;
        }

        inner.remote_endpoint = None;
        self.set_state(&mut inner, ConnectionState::Disconnected);
        warn!("[{}] Connect to {} failed: {}", self.id, endpoint, error);
        self.events.publish(ConnectionEvent::ConnectionFailed {
            connection: self.id,
            error: error.to_string(),
        });
    }

    /// Install the socket, arm the receive loop, then open the handshake
    fn start_session(self: &Arc<Self>, generation: u64, stream: TcpStream, op: PendingOp) {
        let mut inner = self.inner.lock();
        if inner.generation != generation || inner.state != ConnectionState::Connecting {
            debug!("[{}] Connection torn down before socket connect completed", self.id);
            return;
        }

        let (read_half, write_half) = stream.into_split();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let reader = self.config.runtime.spawn(Arc::clone(self).receive_loop(
            generation,
            read_half,
            PendingOp::begin(&self.pending_ops),
        ));
        let writer = self.config.runtime.spawn(Arc::clone(self).write_loop(
            generation,
            write_half,
            outbound_rx,
            PendingOp::begin(&self.pending_ops),
        ));

        inner.socket = Some(SocketHandle {
            outbound: outbound_tx,
            reader,
            writer,
        });
        self.liveness.touch();

        let request = if self.config.handshake {
            let offered: Vec<Protocol> = self.config.protocols.values().copied().collect();
            self.config.codec.connect_request(&offered)
        } else {
            None
        };

        match request {
            Some(request) => {
                if let Err(e) = self.queue(&inner, &request) {
                    error!("[{}] Failed to send handshake: {}", self.id, e);
                    self.teardown_locked(&mut inner, DisconnectReason::ProtocolError, false);
                    return;
                }
                debug!("[{}] Socket connected, awaiting handshake", self.id);
                inner.handshake_op = Some(op);
            }
            None => {
                self.finish_handshake(&mut inner, None);
            }
        }
    }

    fn finish_handshake(&self, inner: &mut Inner, peer: Option<&[Protocol]>) {
        if let Some(peer) = peer {
            inner.protocols = intersect(&self.config.protocols, peer);
            if inner.protocols.is_empty() {
                warn!("[{}] No protocol in common with peer", self.id);
            }
        }
        inner.handshake_op = None;
        self.set_state(inner, ConnectionState::Connected);

        let protocols: Vec<Protocol> = inner.protocols.values().copied().collect();
        info!(
            "[{}] Connected to {} ({} protocols)",
            self.id,
            inner.remote_endpoint.as_deref().unwrap_or("?"),
            protocols.len()
        );
        self.events.publish(ConnectionEvent::Connected {
            connection: self.id,
            protocols,
        });
    }

    async fn receive_loop(self: Arc<Self>, generation: u64, mut read_half: OwnedReadHalf, _op: PendingOp) {
        let mut receiver = FrameReceiver::new(self.config.receive_buffer_size, self.config.max_frame_size);
        let mut chunk = vec![0u8; self.config.receive_buffer_size];

        loop {
            let n = match read_half.read(&mut chunk).await {
                Ok(0) => {
                    info!("[{}] Peer closed the connection", self.id);
                    self.teardown(generation, DisconnectReason::ConnectionFailed);
                    return;
                }
                Ok(n) => n,
                Err(e) => {
                    warn!("[{}] Receive failed: {}", self.id, e);
                    self.teardown(generation, DisconnectReason::ConnectionFailed);
                    return;
                }
            };

            receiver.extend(&chunk[..n]);
            loop {
                match receiver.next_message(&*self.config.codec) {
                    Ok(Some(decoded)) => {
                        if !self.dispatch(generation, decoded) {
                            debug!("[{}] Receive loop outlived its session", self.id);
                            return;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("[{}] Undecodable inbound data: {}", self.id, e);
                        self.teardown(generation, DisconnectReason::ProtocolError);
                        return;
                    }
                }
            }
        }
    }

    async fn write_loop(
        self: Arc<Self>,
        generation: u64,
        mut write_half: OwnedWriteHalf,
        mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
        _op: PendingOp,
    ) {
        while let Some(frame) = outbound.recv().await {
            if let Err(e) = write_half.write_all(&frame).await {
                warn!("[{}] Send failed: {}", self.id, e);
                self.teardown(generation, DisconnectReason::ConnectionFailed);
                return;
            }
        }

        // Queue closed by a graceful disconnect
        if let Err(e) = write_half.shutdown().await {
            debug!("[{}] Shutdown of write half failed: {}", self.id, e);
        }
    }

    /// Handle one decoded inbound message
    ///
    /// # Returns
    /// `false` once the session this receive loop belongs to is gone
    fn dispatch(self: &Arc<Self>, generation: u64, decoded: Decoded<C::Message>) -> bool {
        self.liveness.touch();
        self.metrics.increment_received();

        match self.config.codec.control(&decoded.message) {
            Some(ControlMessage::Ping { interval }) => self.handle_ping(generation, interval),
            Some(ControlMessage::Connected { protocols }) => self.handle_connected(generation, &protocols),
            None => {
                let inner = self.inner.lock();
                if !inner.owns_socket(generation) {
                    return false;
                }
                self.events.publish(ConnectionEvent::MessageReceived {
                    connection: self.id,
                    kind: decoded.kind,
                    message: Arc::new(decoded.message),
                });
                true
            }
        }
    }

    fn handle_ping(self: &Arc<Self>, generation: u64, interval: Duration) -> bool {
        let mut inner = self.inner.lock();
        if !inner.owns_socket(generation) {
            return false;
        }

        if interval.is_zero() {
            if inner.keep_alive.is_armed() {
                debug!("[{}] Peer disabled keep-alive", self.id);
            }
            inner.keep_alive.cancel();
        } else {
            let weak: Weak<Self> = Arc::downgrade(self);
            let rearmed = inner.keep_alive.rearm(&self.config.runtime, interval, move || {
                weak.upgrade()
                    .map(|shared| shared.check_liveness(generation))
                    .unwrap_or(false)
            });
            if rearmed {
                debug!("[{}] Keep-alive interval now {:?}", self.id, interval);
            }
        }
        inner.ping_interval = interval;

        if let Some(pong) = self.config.codec.pong() {
            if let Err(e) = self.queue(&inner, &pong) {
                warn!("[{}] Failed to answer ping: {}", self.id, e);
            }
        }
        true
    }

    fn handle_connected(&self, generation: u64, protocols: &[Protocol]) -> bool {
        let mut inner = self.inner.lock();
        if !inner.owns_socket(generation) {
            return false;
        }
        if inner.state != ConnectionState::Connecting {
            warn!("[{}] Ignoring Connected while {}", self.id, inner.state);
            return true;
        }

        self.finish_handshake(&mut inner, Some(protocols));
        true
    }

    /// Keep-alive tick
    ///
    /// # Returns
    /// `false` to stop the timer
    fn check_liveness(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if !inner.owns_socket(generation) || inner.ping_interval.is_zero() {
            return false;
        }

        if self.liveness.is_expired(inner.ping_interval) {
            warn!(
                "[{}] No message for {:?} (interval {:?}), dropping connection",
                self.id,
                self.liveness.since_last_message(),
                inner.ping_interval
            );
            self.metrics.increment_keep_alive_timeouts();
            self.teardown_locked(&mut inner, DisconnectReason::Timeout, false);
            return false;
        }
        true
    }

    /// Tear down on behalf of an I/O task, ignoring stale sessions
    fn teardown(&self, generation: u64, reason: DisconnectReason) {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            debug!("[{}] Ignoring {} from a previous session", self.id, reason);
            return;
        }
        self.teardown_locked(&mut inner, reason, false);
    }

    fn teardown_locked(&self, inner: &mut Inner, reason: DisconnectReason, graceful: bool) -> bool {
        if inner.state == ConnectionState::Disconnected {
            return false;
        }

        self.set_state(inner, ConnectionState::Disconnecting);
        if let Some(socket) = inner.socket.take() {
            socket.close(graceful, &self.config.runtime, self.config.close_timeout);
        }
        inner.announced_types.clear();
        inner.keep_alive.cancel();
        inner.handshake_op = None;
        inner.ping_interval = Duration::ZERO;
        inner.protocols = self.config.protocols.clone();
        let endpoint = inner.remote_endpoint.take();
        self.set_state(inner, ConnectionState::Disconnected);

        info!(
            "[{}] Disconnected from {} ({})",
            self.id,
            endpoint.as_deref().unwrap_or("?"),
            reason
        );
        self.events.publish(ConnectionEvent::Disconnected {
            connection: self.id,
            reason,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::core::builder::ClientConnectionBuilder;

    fn connection() -> ClientConnection<JsonCodec> {
        ClientConnectionBuilder::new()
            .codec(JsonCodec::new())
            .protocols([Protocol::new(1, 1)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_pending_op_guard_balances() {
        let counter = Arc::new(AtomicUsize::new(0));
        let first = PendingOp::begin(&counter);
        let second = PendingOp::begin(&counter);
        assert_eq!(counter.load(Ordering::Acquire), 2);

        drop(first);
        drop(second);
        assert_eq!(counter.load(Ordering::Acquire), 0);
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_arguments_without_transition() {
        let connection = connection();
        let events = connection.subscribe();

        assert!(matches!(
            connection.connect("", MessageTypes::RELIABLE).await,
            Err(LinkError::InvalidArgument(_))
        ));
        assert!(matches!(
            connection.connect("127.0.0.1:1", MessageTypes::ALL).await,
            Err(LinkError::NotSupported(_))
        ));

        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert_eq!(connection.metrics().connect_attempts, 0);
        assert!(events.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_idle_connection_accessors() {
        let connection = connection();

        assert!(!connection.is_connected());
        assert_eq!(connection.remote_endpoint(), None);
        assert_eq!(connection.protocols(), vec![Protocol::new(1, 1)]);
        assert_eq!(connection.ping_interval(), Duration::ZERO);
        assert_eq!(connection.pending_operations(), 0);
        assert!(!connection.is_keep_alive_armed());
    }

    #[tokio::test]
    async fn test_disconnect_when_idle_is_silent() {
        let connection = connection();
        let events = connection.subscribe();

        assert!(!connection.disconnect(true, DisconnectReason::Requested));
        assert!(events.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_send_requires_connected() {
        let connection = connection();
        let message = crate::codec::WireMessage::Pong;

        assert!(matches!(connection.send(&message), Err(LinkError::InvalidOperation(_))));
        assert!(matches!(
            connection.send_with_types(&message, &["a::B"]),
            Err(LinkError::InvalidOperation(_))
        ));
        assert!(matches!(
            connection.send_with_types(&message, &[""]),
            Err(LinkError::InvalidArgument(_))
        ));
        // Nothing was registered by the failed sends
        assert!(connection.type_map().is_empty());
    }
}
