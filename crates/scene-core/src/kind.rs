//! Message kind (Create / Remove / Move / Rotate / Scale).

use std::fmt;

/// What a [`crate::Message`] does to the scene.
///
/// The wire carries the kind as an integer. Values outside `1..=5`
/// are kept verbatim in [`MessageKind::Unknown`] so they can be
/// rebroadcast unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Create,
    Remove,
    Move,
    Rotate,
    Scale,

    /// Any other wire value, including `0` (no type set).
    Unknown(i64),
}

impl MessageKind {
    /// Map a raw wire integer to a kind.
    pub fn from_wire(v: i64) -> Self {
        match v {
            1 => MessageKind::Create,
            2 => MessageKind::Remove,
            3 => MessageKind::Move,
            4 => MessageKind::Rotate,
            5 => MessageKind::Scale,
            other => MessageKind::Unknown(other),
        }
    }

    /// Raw wire integer for this kind.
    pub fn as_wire(self) -> i64 {
        match self {
            MessageKind::Create => 1,
            MessageKind::Remove => 2,
            MessageKind::Move => 3,
            MessageKind::Rotate => 4,
            MessageKind::Scale => 5,
            MessageKind::Unknown(v) => v,
        }
    }

    /// True for Move / Rotate / Scale, the kinds that overwrite a transform slot.
    pub fn is_transform(self) -> bool {
        matches!(
            self,
            MessageKind::Move | MessageKind::Rotate | MessageKind::Scale
        )
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Create => f.write_str("create"),
            MessageKind::Remove => f.write_str("remove"),
            MessageKind::Move => f.write_str("move"),
            MessageKind::Rotate => f.write_str("rotate"),
            MessageKind::Scale => f.write_str("scale"),
            MessageKind::Unknown(v) => write!(f, "unknown({v})"),
        }
    }
}
