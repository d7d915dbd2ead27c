//! The unit of change flowing between clients and the hub.
//!
//! A [`Message`] is **transport-agnostic**: the JSON encoding lives in
//! the `scene-protocol` crate; this module is purely logical.

use crate::kind::MessageKind;

/// One change to the scene, as sent by a client and rebroadcast by the hub.
///
/// - `model_handle`: on Create, a geometry-type hint (e.g. `"cube"`)
///   that the hub rewrites into a unique handle; otherwise the exact
///   handle of a live model.
/// - `float_array_data`: vector payload (position / rotation / scale
///   components, or creation parameters).
/// - `string_data`: free-form auxiliary payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub model_handle: String,
    pub float_array_data: Vec<f64>,
    pub string_data: String,
}

impl Message {
    /// Generic constructor with an empty string payload.
    pub fn new(kind: MessageKind, model_handle: impl Into<String>, data: Vec<f64>) -> Self {
        Message {
            kind,
            model_handle: model_handle.into(),
            float_array_data: data,
            string_data: String::new(),
        }
    }

    /// Create request for a model of the given geometry type.
    pub fn create(geometry_hint: impl Into<String>, string_data: impl Into<String>) -> Self {
        Message {
            string_data: string_data.into(),
            ..Message::new(MessageKind::Create, geometry_hint, Vec::new())
        }
    }

    pub fn remove(handle: impl Into<String>) -> Self {
        Message::new(MessageKind::Remove, handle, Vec::new())
    }

    pub fn move_to(handle: impl Into<String>, position: Vec<f64>) -> Self {
        Message::new(MessageKind::Move, handle, position)
    }

    pub fn rotate(handle: impl Into<String>, rotation: Vec<f64>) -> Self {
        Message::new(MessageKind::Rotate, handle, rotation)
    }

    pub fn scale(handle: impl Into<String>, scale: Vec<f64>) -> Self {
        Message::new(MessageKind::Scale, handle, scale)
    }

    /// Replace the string payload, builder style.
    pub fn with_string_data(mut self, string_data: impl Into<String>) -> Self {
        self.string_data = string_data.into();
        self
    }
}
