use crate::core::type_map::TypeEntry;
use crate::traits::error::Result;
use crate::traits::protocol::Protocol;
use std::fmt::Debug;
use std::time::Duration;

/// Transport-owned control messages
///
/// The connection intercepts these before anything reaches the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// Peer announces its keep-alive interval, zero disables keep-alive
    Ping { interval: Duration },
    /// Peer finished the handshake and advertises its protocols
    Connected { protocols: Vec<Protocol> },
}

/// Trait for framing messages on a byte stream
///
/// Implement this trait to plug a wire format into the transport. Decoding
/// runs on the receive task, encoding on whichever thread calls `send`.
///
/// # Example
///
/// ```ignore
/// struct MyCodec;
///
/// impl MessageCodec for MyCodec {
///     type Message = MyMessage;
///
///     fn decode(&self, src: &[u8]) -> Result<Option<(MyMessage, usize)>> {
///         // Return Ok(None) until a whole frame is buffered
///     }
///
///     fn encode(&self, message: &MyMessage, dst: &mut Vec<u8>) -> Result<()> {
///         // Append one frame to dst
///     }
///
///     fn kind(&self, message: &MyMessage) -> u16 {
///         message.kind()
///     }
///
///     fn control(&self, message: &MyMessage) -> Option<ControlMessage> {
///         match message {
///             MyMessage::Ping(ms) => Some(ControlMessage::Ping {
///                 interval: Duration::from_millis(*ms),
///             }),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait MessageCodec: Send + Sync + 'static {
    /// The decoded message type
    type Message: Send + Sync + Debug + 'static;

    /// Decode one message from the front of `src`
    ///
    /// # Returns
    /// * `Ok(Some((message, consumed)))` - A whole frame of `consumed` bytes
    /// * `Ok(None)` - More bytes are needed
    /// * `Err(LinkError)` - The stream is corrupt
    fn decode(&self, src: &[u8]) -> Result<Option<(Self::Message, usize)>>;

    /// Append one encoded frame for `message` to `dst`
    fn encode(&self, message: &Self::Message, dst: &mut Vec<u8>) -> Result<()>;

    /// Declared numeric kind of a message
    fn kind(&self, message: &Self::Message) -> u16;

    /// Classify a message as a control message, if it is one
    fn control(&self, message: &Self::Message) -> Option<ControlMessage>;

    /// Handshake request sent right after the socket connects
    ///
    /// Returning `None` skips the protocol handshake entirely.
    fn connect_request(&self, _protocols: &[Protocol]) -> Option<Self::Message> {
        None
    }

    /// Reply sent for every inbound ping
    fn pong(&self) -> Option<Self::Message> {
        None
    }

    /// Message announcing newly assigned type ids to the peer
    fn type_definitions(&self, _entries: &[TypeEntry]) -> Option<Self::Message> {
        None
    }
}
