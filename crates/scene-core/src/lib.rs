//! scene-core
//!
//! Pure scene synchronization state:
//! - messages and their kinds
//! - per-object model records
//! - the handle → model store
//! - unique handle allocation with index reuse
//! - the scene state machine tying them together

pub mod kind;
pub mod message;
pub mod model;
pub mod scene_store;
pub mod handle_allocator;
pub mod scene;
pub mod error;

pub use kind::MessageKind;
pub use message::Message;
pub use model::Model;
pub use scene_store::SceneStore;
pub use handle_allocator::{compose_handle, parse_index, HandleAllocator, HANDLE_DELIMITER};
pub use scene::{Applied, Effect, Scene};
pub use error::SceneError;
