//! Low-level wire types.
//!
//! [`WireMessage`] is the serde mirror of the JSON frame. The integer
//! `messageType` ids are interpreted by `scene_core::MessageKind`.
//!
//! The conversion to and from `scene_core::Message` lives in
//! `json_codec`.

use serde::{Deserialize, Serialize};

/// A JSON frame as it travels over the socket.
///
/// Every field is optional on input (missing means `0` / `""` / `[]`)
/// and always present on output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireMessage {
    pub message_type: i64,
    pub model_handle: String,
    pub float_array_data: Vec<f64>,
    pub string_data: String,
}
