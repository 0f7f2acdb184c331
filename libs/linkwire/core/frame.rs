//! Receive buffer and frame extraction
//!
//! The receive task appends whatever the socket hands it and then pulls
//! complete messages out until the codec asks for more bytes. Consumed bytes
//! are compacted away lazily, once the cursor passes half the buffer or the
//! buffer runs dry.

use crate::traits::{LinkError, MessageCodec, Result};

/// A message pulled off the stream
#[derive(Debug)]
pub struct Decoded<M> {
    pub kind: u16,
    pub message: M,
}

/// Owns the receive buffer and a read cursor into it
///
/// Only the receive task touches a `FrameReceiver`; there is no locking.
pub struct FrameReceiver {
    buffer: Vec<u8>,
    cursor: usize,
    max_frame_size: usize,
}

impl FrameReceiver {
    /// # Arguments
    /// * `capacity` - Initial buffer size, normally the socket read size
    /// * `max_frame_size` - Largest frame accepted, whole or still partial,
    ///   before the stream is declared corrupt
    pub fn new(capacity: usize, max_frame_size: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            cursor: 0,
            max_frame_size,
        }
    }

    /// Append bytes from a completed read
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes received but not yet decoded
    pub fn pending(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Decode the next complete message, if one is buffered
    ///
    /// # Returns
    /// * `Ok(Some(decoded))` - One message, cursor advanced past it
    /// * `Ok(None)` - Need more bytes
    /// * `Err(LinkError)` - Codec rejected the stream or a frame outgrew
    ///   `max_frame_size`
    pub fn next_message<C: MessageCodec>(&mut self, codec: &C) -> Result<Option<Decoded<C::Message>>> {
        let unread = &self.buffer[self.cursor..];
        if unread.is_empty() {
            self.compact();
            return Ok(None);
        }

        match codec.decode(unread)? {
            Some((message, consumed)) => {
                if consumed == 0 || consumed > unread.len() {
                    return Err(LinkError::Codec(format!(
                        "codec consumed {} of {} bytes",
                        consumed,
                        unread.len()
                    )));
                }
                if consumed > self.max_frame_size {
                    return Err(LinkError::FrameTooLarge {
                        size: consumed,
                        limit: self.max_frame_size,
                    });
                }
                self.cursor += consumed;
                if self.cursor * 2 >= self.buffer.len() {
                    self.compact();
                }
                Ok(Some(Decoded {
                    kind: codec.kind(&message),
                    message,
                }))
            }
            None => {
                if unread.len() > self.max_frame_size {
                    return Err(LinkError::FrameTooLarge {
                        size: unread.len(),
                        limit: self.max_frame_size,
                    });
                }
                self.compact();
                Ok(None)
            }
        }
    }

    fn compact(&mut self) {
        if self.cursor > 0 {
            self.buffer.drain(..self.cursor);
            self.cursor = 0;
        }
    }
}
