//! # linkwire traits
//!
//! Seams between the transport and its collaborators:
//!
//! - **MessageCodec**: frame and deframe messages, classify control messages
//! - **Connector**: open the reliable socket
//! - **RetryPolicy**: caller-side retry pacing
//! - **Protocol**: sub-protocol descriptors negotiated at handshake

pub mod codec;
pub mod connector;
pub mod error;
pub mod protocol;
pub mod retry;

pub use codec::{ControlMessage, MessageCodec};
pub use connector::{Connector, TcpConnector};
pub use error::{LinkError, Result};
pub use protocol::{intersect, protocol_set, MessageTypes, Protocol, ProtocolSet};
pub use retry::{ExponentialBackoff, FixedDelay, NoRetry, RetryPolicy};
