use crate::core::type_map::TypeMap;
use crate::traits::*;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a ClientConnection
///
/// Built with the type-state builder (`linkwire::builder()`); codec and
/// offered protocols must be set before it will build.
pub struct ConnectionConfig<C>
where
    C: MessageCodec,
{
    /// Wire format for this connection
    pub(crate) codec: Arc<C>,

    /// Protocols offered to the peer during handshake
    pub(crate) protocols: ProtocolSet,

    /// Opens the reliable socket
    pub(crate) connector: Arc<dyn Connector>,

    /// Type vocabulary for the outbound path, possibly shared
    pub(crate) type_map: Arc<TypeMap>,

    /// Runtime that drives socket and timer tasks
    pub(crate) runtime: tokio::runtime::Handle,

    /// Upper bound for the socket connect
    pub(crate) connect_timeout: Duration,

    /// Bytes requested per socket read
    pub(crate) receive_buffer_size: usize,

    /// Largest undecoded frame accepted before the stream is declared corrupt
    pub(crate) max_frame_size: usize,

    /// Send the codec's connect request and wait for the peer's Connected
    pub(crate) handshake: bool,

    /// Graceful disconnect gives the writer this long to flush
    pub(crate) close_timeout: Duration,
}

impl<C> ConnectionConfig<C>
where
    C: MessageCodec,
{
    pub fn protocols(&self) -> &ProtocolSet {
        &self.protocols
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn receive_buffer_size(&self) -> usize {
        self.receive_buffer_size
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    pub fn has_handshake(&self) -> bool {
        self.handshake
    }

    pub fn close_timeout(&self) -> Duration {
        self.close_timeout
    }
}
