//! Error types for the scene state machine.
//!
//! None of these are fatal: the router logs them and carries on with
//! the next message.

use thiserror::Error;

use crate::kind::MessageKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// A Move / Rotate / Scale / Remove addressed a handle that is not live.
    #[error("{kind} for unknown model handle {handle:?}")]
    UnknownHandle { kind: MessageKind, handle: String },

    /// A handle whose numeric index prefix could not be parsed.
    #[error("model handle {0:?} has no numeric index prefix")]
    MalformedHandle(String),
}
