//! Wire formats shipped with linkwire

pub mod json;

pub use json::{JsonCodec, WireMessage, WireTypeEntry};
