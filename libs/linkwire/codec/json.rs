//! Length-prefixed JSON frames
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ len: u32 BE  │ JSON WireMessage (len bytes) │
//! └──────────────┴──────────────────────────────┘
//! ```
//!
//! A reference wire format: enough to drive the transport end to end and to
//! write peers in tests, not a format anyone should standardize on.

use crate::core::type_map::TypeEntry;
use crate::traits::{ControlMessage, LinkError, MessageCodec, Protocol, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const LENGTH_PREFIX: usize = 4;

pub const KIND_PING: u16 = 1;
pub const KIND_PONG: u16 = 2;
pub const KIND_CONNECT: u16 = 3;
pub const KIND_CONNECTED: u16 = 4;
pub const KIND_TYPE_DEFINITIONS: u16 = 5;

/// Type announcement as it travels on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTypeEntry {
    pub name: String,
    pub id: u32,
}

impl From<&TypeEntry> for WireTypeEntry {
    fn from(entry: &TypeEntry) -> Self {
        Self {
            name: entry.name.to_string(),
            id: entry.id,
        }
    }
}

/// Every message the JSON codec understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    Ping {
        interval_ms: u64,
    },
    Pong,
    /// Client's handshake request
    Connect {
        protocols: Vec<Protocol>,
    },
    /// Server's handshake answer
    Connected {
        protocols: Vec<Protocol>,
    },
    TypeDefinitions {
        entries: Vec<WireTypeEntry>,
    },
    App {
        kind: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        type_id: Option<u32>,
        body: serde_json::Value,
    },
}

impl WireMessage {
    pub fn app(kind: u16, body: serde_json::Value) -> Self {
        WireMessage::App {
            kind,
            type_id: None,
            body,
        }
    }

    pub fn kind(&self) -> u16 {
        match self {
            WireMessage::Ping { .. } => KIND_PING,
            WireMessage::Pong => KIND_PONG,
            WireMessage::Connect { .. } => KIND_CONNECT,
            WireMessage::Connected { .. } => KIND_CONNECTED,
            WireMessage::TypeDefinitions { .. } => KIND_TYPE_DEFINITIONS,
            WireMessage::App { kind, .. } => *kind,
        }
    }
}

/// Codec for [`WireMessage`] frames
#[derive(Debug, Clone, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        JsonCodec
    }

    /// Encode one message into a standalone frame
    pub fn to_frame(&self, message: &WireMessage) -> Result<Vec<u8>> {
        let mut frame = Vec::new();
        self.encode(message, &mut frame)?;
        Ok(frame)
    }
}

impl MessageCodec for JsonCodec {
    type Message = WireMessage;

    fn decode(&self, src: &[u8]) -> Result<Option<(WireMessage, usize)>> {
        if src.len() < LENGTH_PREFIX {
            return Ok(None);
        }
        let mut prefix = [0u8; LENGTH_PREFIX];
        prefix.copy_from_slice(&src[..LENGTH_PREFIX]);
        let len = u32::from_be_bytes(prefix) as usize;
        if len == 0 {
            return Err(LinkError::Codec("empty frame".into()));
        }

        let total = LENGTH_PREFIX + len;
        if src.len() < total {
            return Ok(None);
        }

        let message = serde_json::from_slice(&src[LENGTH_PREFIX..total])?;
        Ok(Some((message, total)))
    }

    fn encode(&self, message: &WireMessage, dst: &mut Vec<u8>) -> Result<()> {
        let body = serde_json::to_vec(message)?;
        let len = u32::try_from(body.len())
            .map_err(|_| LinkError::Codec(format!("frame of {} bytes", body.len())))?;
        dst.extend_from_slice(&len.to_be_bytes());
        dst.extend_from_slice(&body);
        Ok(())
    }

    fn kind(&self, message: &WireMessage) -> u16 {
        message.kind()
    }

    fn control(&self, message: &WireMessage) -> Option<ControlMessage> {
        match message {
            WireMessage::Ping { interval_ms } => Some(ControlMessage::Ping {
                interval: Duration::from_millis(*interval_ms),
            }),
            WireMessage::Connected { protocols } => Some(ControlMessage::Connected {
                protocols: protocols.clone(),
            }),
            _ => None,
        }
    }

    fn connect_request(&self, protocols: &[Protocol]) -> Option<WireMessage> {
        Some(WireMessage::Connect {
            protocols: protocols.to_vec(),
        })
    }

    fn pong(&self) -> Option<WireMessage> {
        Some(WireMessage::Pong)
    }

    fn type_definitions(&self, entries: &[TypeEntry]) -> Option<WireMessage> {
        Some(WireMessage::TypeDefinitions {
            entries: entries.iter().map(WireTypeEntry::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape_is_tagged_json() {
        let frame = JsonCodec.to_frame(&WireMessage::Ping { interval_ms: 500 }).unwrap();
        let body = &frame[LENGTH_PREFIX..];
        assert_eq!(u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize, body.len());

        let value: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(value, json!({"type": "ping", "interval_ms": 500}));
    }

    #[test]
    fn test_decode_waits_for_whole_frame() {
        let frame = JsonCodec.to_frame(&WireMessage::app(42, json!({"x": 1}))).unwrap();
        assert!(JsonCodec.decode(&frame[..2]).unwrap().is_none());
        assert!(JsonCodec.decode(&frame[..frame.len() - 1]).unwrap().is_none());

        let (message, consumed) = JsonCodec.decode(&frame).unwrap().unwrap();
        assert_eq!(consumed, frame.len());
        assert_eq!(JsonCodec.kind(&message), 42);
    }

    #[test]
    fn test_control_classification() {
        assert_eq!(
            JsonCodec.control(&WireMessage::Ping { interval_ms: 0 }),
            Some(ControlMessage::Ping {
                interval: Duration::ZERO
            })
        );
        assert_eq!(
            JsonCodec.control(&WireMessage::Connected {
                protocols: vec![Protocol::new(2, 1)]
            }),
            Some(ControlMessage::Connected {
                protocols: vec![Protocol::new(2, 1)]
            })
        );
        assert_eq!(JsonCodec.control(&WireMessage::Pong), None);
        assert_eq!(JsonCodec.control(&WireMessage::app(9, json!(null))), None);
    }

    #[test]
    fn test_garbage_is_codec_error() {
        let mut frame = 3u32.to_be_bytes().to_vec();
        frame.extend_from_slice(b"{{{");
        assert!(matches!(JsonCodec.decode(&frame), Err(LinkError::Codec(_))));

        assert!(matches!(JsonCodec.decode(&[0, 0, 0, 0]), Err(LinkError::Codec(_))));
    }
}
