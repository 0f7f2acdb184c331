pub mod states;

use crate::core::config::ConnectionConfig;
use crate::core::connection::ClientConnection;
use crate::core::settings::ConnectionSettings;
use crate::core::type_map::TypeMap;
use crate::traits::*;
use states::*;
use std::sync::Arc;
use std::time::Duration;

/// Type-state builder for ClientConnection
///
/// The codec and the offered protocol set are required; `build()` only
/// exists once both are set. Everything else falls back to
/// [`ConnectionSettings::default`].
pub struct ClientConnectionBuilder<Cs, Ps, C>
where
    Cs: CodecState,
    Ps: ProtocolsState,
{
    _state: TypeState<Cs, Ps>,
    codec: Option<C>,
    protocols: ProtocolSet,
    connector: Option<Arc<dyn Connector>>,
    type_map: Option<Arc<TypeMap>>,
    runtime: Option<tokio::runtime::Handle>,
    settings: ConnectionSettings,
}

impl ClientConnectionBuilder<NoCodec, NoProtocols, ()> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            codec: None,
            protocols: ProtocolSet::new(),
            connector: None,
            type_map: None,
            runtime: None,
            settings: ConnectionSettings::default(),
        }
    }
}

impl Default for ClientConnectionBuilder<NoCodec, NoProtocols, ()> {
    fn default() -> Self {
        Self::new()
    }
}

// Codec setting
impl<Ps> ClientConnectionBuilder<NoCodec, Ps, ()>
where
    Ps: ProtocolsState,
{
    pub fn codec<NewC>(self, codec: NewC) -> ClientConnectionBuilder<HasCodec, Ps, NewC>
    where
        NewC: MessageCodec,
    {
        ClientConnectionBuilder {
            _state: TypeState::new(),
            codec: Some(codec),
            protocols: self.protocols,
            connector: self.connector,
            type_map: self.type_map,
            runtime: self.runtime,
            settings: self.settings,
        }
    }
}

// Protocol setting
impl<Cs, C> ClientConnectionBuilder<Cs, NoProtocols, C>
where
    Cs: CodecState,
{
    /// Protocols offered to the peer; fixed for the life of the connection
    pub fn protocols(
        self,
        protocols: impl IntoIterator<Item = Protocol>,
    ) -> ClientConnectionBuilder<Cs, HasProtocols, C> {
        ClientConnectionBuilder {
            _state: TypeState::new(),
            codec: self.codec,
            protocols: protocol_set(protocols),
            connector: self.connector,
            type_map: self.type_map,
            runtime: self.runtime,
            settings: self.settings,
        }
    }
}

// Optional configuration methods
impl<Cs, Ps, C> ClientConnectionBuilder<Cs, Ps, C>
where
    Cs: CodecState,
    Ps: ProtocolsState,
{
    /// Replace the TCP connector, e.g. to bind a local address
    pub fn connector(mut self, connector: impl Connector) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Share a type map with other connections talking to the same peer
    pub fn type_map(mut self, type_map: Arc<TypeMap>) -> Self {
        self.type_map = Some(type_map);
        self
    }

    /// Runtime for socket and timer tasks (default: the current one)
    pub fn runtime(mut self, runtime: tokio::runtime::Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Take every tunable from loaded settings
    pub fn settings(mut self, settings: ConnectionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.settings.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn receive_buffer_size(mut self, size: usize) -> Self {
        self.settings.receive_buffer_size = size;
        self
    }

    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.settings.max_frame_size = size;
        self
    }

    /// Bound on flushing queued frames during a graceful disconnect
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.settings.close_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Disable to treat the socket connect as the end of the handshake
    pub fn handshake(mut self, enabled: bool) -> Self {
        self.settings.handshake = enabled;
        self
    }
}

// Build method - only available when all required fields are set
impl<C> ClientConnectionBuilder<HasCodec, HasProtocols, C>
where
    C: MessageCodec,
{
    pub fn build(self) -> Result<ClientConnection<C>> {
        let codec = self
            .codec
            .ok_or_else(|| LinkError::Configuration("codec must be set".into()))?;

        if self.protocols.is_empty() {
            return Err(LinkError::Configuration("at least one protocol must be offered".into()));
        }
        self.settings.validate()?;

        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => tokio::runtime::Handle::try_current().map_err(|e| {
                LinkError::Configuration(format!("no tokio runtime available: {}", e))
            })?,
        };

        let config = ConnectionConfig {
            codec: Arc::new(codec),
            protocols: self.protocols,
            connector: self
                .connector
                .unwrap_or_else(|| Arc::new(TcpConnector) as Arc<dyn Connector>),
            type_map: self.type_map.unwrap_or_default(),
            runtime,
            connect_timeout: self.settings.connect_timeout(),
            receive_buffer_size: self.settings.receive_buffer_size,
            max_frame_size: self.settings.max_frame_size,
            handshake: self.settings.handshake,
            close_timeout: self.settings.close_timeout(),
        };

        Ok(ClientConnection::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;

    #[tokio::test]
    async fn test_build_with_required_fields() {
        let connection = ClientConnectionBuilder::new()
            .codec(JsonCodec::new())
            .protocols([Protocol::new(1, 1), Protocol::new(2, 1)])
            .connect_timeout(Duration::from_millis(500))
            .build()
            .unwrap();

        assert_eq!(connection.config().connect_timeout(), Duration::from_millis(500));
        assert_eq!(connection.config().protocols().len(), 2);
        assert!(connection.config().has_handshake());
    }

    #[tokio::test]
    async fn test_empty_protocol_set_is_rejected() {
        let result = ClientConnectionBuilder::new()
            .codec(JsonCodec::new())
            .protocols(Vec::new())
            .build();
        assert!(matches!(result, Err(LinkError::Configuration(_))));
    }

    #[test]
    fn test_build_outside_runtime_needs_handle() {
        let result = ClientConnectionBuilder::new()
            .protocols([Protocol::new(1, 1)])
            .codec(JsonCodec::new())
            .build();
        assert!(matches!(result, Err(LinkError::Configuration(_))));
    }
}
