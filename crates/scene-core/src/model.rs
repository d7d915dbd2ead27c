//! Authoritative record for a single scene object.

use crate::kind::MessageKind;
use crate::message::Message;

/// Last-known state of one model.
///
/// A model only exists once a Create has been applied, so `create`
/// is not optional. The transform slots start empty and each holds
/// only the most recent message of its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub create: Message,
    pub position: Option<Message>,
    pub rotation: Option<Message>,
    pub scale: Option<Message>,
}

impl Model {
    /// New model from its (already handle-rewritten) create message.
    pub fn new(create: Message) -> Self {
        Model {
            create,
            position: None,
            rotation: None,
            scale: None,
        }
    }

    /// Overwrite the slot matching `msg.kind`.
    ///
    /// Returns `false` (and leaves the model untouched) when the
    /// message is not a Move / Rotate / Scale.
    pub fn apply_transform(&mut self, msg: Message) -> bool {
        let slot = match msg.kind {
            MessageKind::Move => &mut self.position,
            MessageKind::Rotate => &mut self.rotation,
            MessageKind::Scale => &mut self.scale,
            _ => return false,
        };
        *slot = Some(msg);
        true
    }

    /// Messages that rebuild this model on a fresh client, in order:
    /// create, then position / rotation / scale when set.
    pub fn replay_messages(&self) -> impl Iterator<Item = &Message> {
        std::iter::once(&self.create).chain(
            [&self.position, &self.rotation, &self.scale]
                .into_iter()
                .flatten(),
        )
    }
}
