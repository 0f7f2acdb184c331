//! # linkwire core
//!
//! The connection state machine and the pieces it is built from:
//!
//! - **TypeMap**: type name to wire id, tracking ids not yet announced
//! - **FrameReceiver**: receive buffer that yields decoded messages
//! - **KeepAliveMonitor**: recurring liveness check driven by peer pings
//! - **ClientConnection**: connect, handshake, dispatch and teardown
//!
//! ## Example
//!
//! ```rust,ignore
//! use linkwire::codec::JsonCodec;
//! use linkwire::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let connection = linkwire::builder()
//!         .codec(JsonCodec::new())
//!         .protocols([Protocol::new(1, 1), Protocol::new(2, 3)])
//!         .connect_timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let events = connection.subscribe();
//!     connection.connect("127.0.0.1:4000", MessageTypes::RELIABLE).await?;
//!
//!     while let Some(event) = events.recv() {
//!         match event {
//!             ConnectionEvent::Connected { protocols, .. } => {
//!                 println!("Negotiated {:?}", protocols);
//!             }
//!             ConnectionEvent::MessageReceived { message, .. } => {
//!                 println!("Message: {:?}", message);
//!             }
//!             other => println!("Event: {:?}", other),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod connection;
pub mod connection_state;
pub mod events;
pub mod frame;
pub mod keep_alive;
pub mod settings;
pub mod type_map;

// Re-export main types
pub use builder::{states, ClientConnectionBuilder};
pub use config::ConnectionConfig;
pub use connection::ClientConnection;
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics};
pub use events::{ConnectionEvent, ConnectionId, DisconnectReason, EventBus, EventReceiver};
pub use frame::{Decoded, FrameReceiver};
pub use keep_alive::{KeepAliveMonitor, LivenessClock};
pub use settings::ConnectionSettings;
pub use type_map::{TypeEntry, TypeMap};

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new connection builder
///
/// # Example
/// ```ignore
/// let connection = linkwire::builder()
///     .protocols([Protocol::new(1, 1)])
///     .codec(JsonCodec::new())
///     .settings(ConnectionSettings::from_file("config/linkwire.yaml")?)
///     .build()?;
/// ```
pub fn builder() -> ClientConnectionBuilder<
    builder::states::NoCodec,
    builder::states::NoProtocols,
    (),
> {
    ClientConnectionBuilder::new()
}
