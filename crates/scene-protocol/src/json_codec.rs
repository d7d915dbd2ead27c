//! JSON encoding/decoding for scene messages.
//!
//! One WebSocket text frame carries exactly one JSON object:
//!
//! ```text
//! {
//!   "messageType":    1,            // 1 create, 2 remove, 3 move, 4 rotate, 5 scale
//!   "modelHandle":    "cube",       // geometry hint on create, handle otherwise
//!   "floatArrayData": [0, 1.5, 0],
//!   "stringData":     "..."
//! }
//! ```
//!
//! A `null` float array is accepted and treated as empty.

use scene_core::{Message, MessageKind};
use thiserror::Error;

use crate::wire_types::WireMessage;

/// Errors that can occur while decoding a frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not valid JSON, or the JSON does not have the message shape.
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    /// A frame type that cannot carry a message (e.g. binary).
    #[error("unsupported frame: {0}")]
    UnsupportedFrame(&'static str),
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Message {
            kind: MessageKind::from_wire(wire.message_type),
            model_handle: wire.model_handle,
            float_array_data: wire.float_array_data,
            string_data: wire.string_data,
        }
    }
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        WireMessage {
            message_type: msg.kind.as_wire(),
            model_handle: msg.model_handle.clone(),
            float_array_data: msg.float_array_data.clone(),
            string_data: msg.string_data.clone(),
        }
    }
}

/// Decode a single JSON text frame.
pub fn decode_message(text: &str) -> Result<Message, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let value = null_floats_to_empty(value);
    let wire: WireMessage = serde_json::from_value(value)?;
    Ok(wire.into())
}

/// Encode a message as a JSON text frame.
pub fn encode_message(msg: &Message) -> String {
    // Serializing this struct cannot fail; non-finite floats are written as `null`.
    serde_json::to_string(&WireMessage::from(msg)).unwrap_or_default()
}

fn null_floats_to_empty(mut value: serde_json::Value) -> serde_json::Value {
    if let Some(obj) = value.as_object_mut() {
        if obj.get("floatArrayData").is_some_and(serde_json::Value::is_null) {
            obj.remove("floatArrayData");
        }
    }
    value
}
