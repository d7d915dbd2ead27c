//! scene-protocol
//!
//! Wire-level encoding/decoding for the scene hub.
//!
//! This crate turns logical scene messages (`scene_core::Message`)
//! into JSON text frames and back again.
//!
//! - [`wire_types`] : the serde frame shape
//! - [`json_codec`] : decode / encode helpers and [`ProtocolError`]

pub mod wire_types;
pub mod json_codec;

pub use json_codec::{decode_message, encode_message, ProtocolError};
pub use wire_types::WireMessage;
