//! # linkwire
//!
//! Client side of a message-oriented transport over TCP.
//!
//! ## Features
//!
//! - **Single-lock state machine**: connect, handshake, dispatch and teardown
//!   serialized under one lock, with stale completions discarded by generation
//! - **Protocol negotiation**: offered sub-protocols narrowed to what the peer
//!   supports
//! - **Keep-alive**: peer-driven ping interval, disconnect after two silent
//!   intervals
//! - **Type registry**: stable wire ids assigned on first use, announced once
//! - **Pluggable wire format**: any `MessageCodec`; `JsonCodec` included

pub mod codec;
pub mod core;
pub mod traits;

// Re-export all traits
pub use traits::*;

// Re-export core functionality
pub use crate::core::{
    builder, connection, connection_state, events, frame, keep_alive, settings, type_map,
    builder::{states, ClientConnectionBuilder},
    config::ConnectionConfig,
    connection::ClientConnection,
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics},
    events::{ConnectionEvent, ConnectionId, DisconnectReason, EventBus, EventReceiver},
    frame::{Decoded, FrameReceiver},
    keep_alive::{KeepAliveMonitor, LivenessClock},
    settings::ConnectionSettings,
    type_map::{TypeEntry, TypeMap},
};

pub use crate::core::builder as connection_builder;

/// Type alias for Result with LinkError
pub type Result<T> = std::result::Result<T, traits::LinkError>;
