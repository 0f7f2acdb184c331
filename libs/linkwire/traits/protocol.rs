//! Protocol descriptors and transport capability flags

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An application sub-protocol offered over a connection
///
/// Protocols are identified by a small integer id. The version travels with
/// the descriptor but negotiation only compares ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Protocol {
    pub id: u8,
    pub version: u32,
}

impl Protocol {
    pub fn new(id: u8, version: u32) -> Self {
        Self { id, version }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.id, self.version)
    }
}

/// Set of protocols keyed by id
pub type ProtocolSet = BTreeMap<u8, Protocol>;

/// Build a protocol set from descriptors, last one wins on duplicate ids
pub fn protocol_set(protocols: impl IntoIterator<Item = Protocol>) -> ProtocolSet {
    protocols.into_iter().map(|p| (p.id, p)).collect()
}

/// Narrow the locally offered set to the ids the peer advertised
///
/// The local descriptor is kept for every surviving id. The result may be
/// empty; deciding what to do about that is left to the application.
pub fn intersect(local: &ProtocolSet, peer: &[Protocol]) -> ProtocolSet {
    peer.iter()
        .filter_map(|p| local.get(&p.id).map(|local| (p.id, *local)))
        .collect()
}

/// Delivery capabilities requested on connect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageTypes(u8);

impl MessageTypes {
    pub const RELIABLE: MessageTypes = MessageTypes(0b01);
    pub const UNRELIABLE: MessageTypes = MessageTypes(0b10);
    pub const ALL: MessageTypes = MessageTypes(0b11);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: MessageTypes) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for MessageTypes {
    fn default() -> Self {
        MessageTypes::RELIABLE
    }
}

impl std::ops::BitOr for MessageTypes {
    type Output = MessageTypes;

    fn bitor(self, rhs: Self) -> Self::Output {
        MessageTypes(self.0 | rhs.0)
    }
}
