//! Lifecycle and message notifications
//!
//! Every subscriber owns an unbounded crossbeam receiver, so publishing never
//! blocks and each subscriber sees every event exactly once, in publish
//! order. Subscribers that dropped their receiver are pruned on the next
//! publish.

use crate::traits::Protocol;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Process-unique connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ConnectionId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Why a connection went down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisconnectReason {
    /// The application asked for it
    Requested,
    /// Socket error, or the peer closed the stream
    ConnectionFailed,
    /// The peer sent something the codec could not accept
    ProtocolError,
    /// Nothing arrived for twice the keep-alive interval
    Timeout,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DisconnectReason::Requested => "requested",
            DisconnectReason::ConnectionFailed => "connection failed",
            DisconnectReason::ProtocolError => "protocol error",
            DisconnectReason::Timeout => "keep-alive timeout",
        };
        f.write_str(text)
    }
}

/// Notifications published by a connection
#[derive(Debug)]
pub enum ConnectionEvent<M> {
    /// Handshake finished; `protocols` is the negotiated set (may be empty)
    Connected {
        connection: ConnectionId,
        protocols: Vec<Protocol>,
    },
    /// The connect attempt never reached the peer
    ConnectionFailed {
        connection: ConnectionId,
        error: String,
    },
    Disconnected {
        connection: ConnectionId,
        reason: DisconnectReason,
    },
    /// An application message, already past control-message handling
    MessageReceived {
        connection: ConnectionId,
        kind: u16,
        message: Arc<M>,
    },
}

// Manual impl: `M` itself need not be Clone behind the Arc
impl<M> Clone for ConnectionEvent<M> {
    fn clone(&self) -> Self {
        match self {
            ConnectionEvent::Connected {
                connection,
                protocols,
            } => ConnectionEvent::Connected {
                connection: *connection,
                protocols: protocols.clone(),
            },
            ConnectionEvent::ConnectionFailed { connection, error } => {
                ConnectionEvent::ConnectionFailed {
                    connection: *connection,
                    error: error.clone(),
                }
            }
            ConnectionEvent::Disconnected { connection, reason } => {
                ConnectionEvent::Disconnected {
                    connection: *connection,
                    reason: *reason,
                }
            }
            ConnectionEvent::MessageReceived {
                connection,
                kind,
                message,
            } => ConnectionEvent::MessageReceived {
                connection: *connection,
                kind: *kind,
                message: Arc::clone(message),
            },
        }
    }
}

impl<M> ConnectionEvent<M> {
    pub fn connection(&self) -> ConnectionId {
        match self {
            ConnectionEvent::Connected { connection, .. }
            | ConnectionEvent::ConnectionFailed { connection, .. }
            | ConnectionEvent::Disconnected { connection, .. }
            | ConnectionEvent::MessageReceived { connection, .. } => *connection,
        }
    }
}

/// Fan-out of connection events to any number of subscribers
pub struct EventBus<M> {
    subscribers: Mutex<Vec<Sender<ConnectionEvent<M>>>>,
}

impl<M> EventBus<M> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a subscriber; it sees events published from now on
    pub fn subscribe(&self) -> EventReceiver<M> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        EventReceiver { rx }
    }

    /// Deliver `event` to every live subscriber
    pub fn publish(&self, event: ConnectionEvent<M>) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<M> Default for EventBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the event stream
pub struct EventReceiver<M> {
    rx: Receiver<ConnectionEvent<M>>,
}

impl<M> EventReceiver<M> {
    /// Try to receive an event (non-blocking)
    pub fn try_recv(&self) -> Option<ConnectionEvent<M>> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Receive an event (blocking)
    pub fn recv(&self) -> Option<ConnectionEvent<M>> {
        self.rx.recv().ok()
    }

    /// Receive an event, giving up after `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ConnectionEvent<M>> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain everything currently queued
    pub fn drain(&self) -> Vec<ConnectionEvent<M>> {
        self.rx.try_iter().collect()
    }
}
