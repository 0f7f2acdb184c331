/// Type-state markers for the builder pattern
///
/// These types track which required fields have been set in the builder at
/// compile-time, preventing a connection without a codec or protocols.

use std::marker::PhantomData;

/// Marker trait for codec state
pub trait CodecState {}

/// Codec has not been set
pub struct NoCodec;
impl CodecState for NoCodec {}

/// Codec has been set
pub struct HasCodec;
impl CodecState for HasCodec {}

/// Marker trait for offered-protocols state
pub trait ProtocolsState {}

/// Protocols have not been set
pub struct NoProtocols;
impl ProtocolsState for NoProtocols {}

/// Protocols have been set
pub struct HasProtocols;
impl ProtocolsState for HasProtocols {}

/// Phantom marker to prevent direct construction
#[derive(Debug, Clone, Copy)]
pub struct TypeState<C, P> {
    _codec: PhantomData<C>,
    _protocols: PhantomData<P>,
}

impl<C, P> TypeState<C, P> {
    pub(crate) fn new() -> Self {
        Self {
            _codec: PhantomData,
            _protocols: PhantomData,
        }
    }
}

impl<C, P> Default for TypeState<C, P> {
    fn default() -> Self {
        Self::new()
    }
}
