//! Scene state machine.
//!
//! [`Scene`] pairs the [`SceneStore`] with the [`HandleAllocator`] and
//! applies one [`Message`] at a time:
//!
//! - Create: rewrites the geometry hint into a unique handle and stores
//!   a new model.
//! - Remove: deletes the model and reclaims its index.
//! - Move / Rotate / Scale: overwrites the matching slot of the model.
//! - anything else: passes through untouched.
//!
//! It is not synchronized; the caller must ensure a single owner.

use crate::error::SceneError;
use crate::handle_allocator::HandleAllocator;
use crate::kind::MessageKind;
use crate::message::Message;
use crate::model::Model;
use crate::scene_store::SceneStore;

/// What applying a message did to the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A model was created under a freshly allocated handle.
    Created { handle: String },

    /// A model was removed.
    ///
    /// `reclaimed` is the index queued for reuse; `None` when the scene
    /// became empty and the reclaim queue was cleared instead.
    Removed {
        handle: String,
        reclaimed: Option<u64>,
    },

    /// A transform slot of an existing model was overwritten.
    Updated { handle: String, kind: MessageKind },

    /// Unknown kind: no state touched.
    PassedThrough,
}

/// A message after it has been applied, ready to broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// The message to fan out. For Create this carries the rewritten handle.
    pub message: Message,
    pub effect: Effect,
}

#[derive(Debug, Default)]
pub struct Scene {
    store: SceneStore,
    allocator: HandleAllocator,
}

impl Scene {
    /// Create a new, empty scene.
    pub fn new() -> Self {
        Scene::default()
    }

    /// Apply a single message.
    ///
    /// On error the scene is unchanged and the message should not be
    /// broadcast.
    pub fn apply(&mut self, msg: Message) -> Result<Applied, SceneError> {
        match msg.kind {
            MessageKind::Create => Ok(self.apply_create(msg)),
            MessageKind::Remove => self.apply_remove(msg),
            kind if kind.is_transform() => self.apply_transform(msg),
            _ => Ok(Applied {
                message: msg,
                effect: Effect::PassedThrough,
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Internal handlers
    // -------------------------------------------------------------------------

    fn apply_create(&mut self, mut msg: Message) -> Applied {
        let handle = self
            .allocator
            .allocate(&msg.model_handle, self.store.len());
        debug_assert!(!self.store.contains(&handle), "duplicate handle {handle}");

        msg.model_handle = handle.clone();
        self.store.put(handle.clone(), Model::new(msg.clone()));

        Applied {
            message: msg,
            effect: Effect::Created { handle },
        }
    }

    fn apply_remove(&mut self, msg: Message) -> Result<Applied, SceneError> {
        if !self.store.contains(&msg.model_handle) {
            return Err(SceneError::UnknownHandle {
                kind: msg.kind,
                handle: msg.model_handle,
            });
        }

        // Reclaim first so a malformed handle leaves the scene untouched.
        let reclaimed = self
            .allocator
            .reclaim(&msg.model_handle, self.store.len() == 1)?;
        self.store.delete(&msg.model_handle);

        Ok(Applied {
            effect: Effect::Removed {
                handle: msg.model_handle.clone(),
                reclaimed,
            },
            message: msg,
        })
    }

    fn apply_transform(&mut self, msg: Message) -> Result<Applied, SceneError> {
        let Some(model) = self.store.get_mut(&msg.model_handle) else {
            return Err(SceneError::UnknownHandle {
                kind: msg.kind,
                handle: msg.model_handle,
            });
        };

        let effect = Effect::Updated {
            handle: msg.model_handle.clone(),
            kind: msg.kind,
        };
        model.apply_transform(msg.clone());

        Ok(Applied {
            message: msg,
            effect,
        })
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Every message a newly joined client needs to rebuild the scene:
    /// per model in creation order, create then position / rotation /
    /// scale where set.
    pub fn replay(&self) -> Vec<Message> {
        self.store
            .iter()
            .flat_map(|(_, model)| model.replay_messages().cloned())
            .collect()
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn allocator(&self) -> &HandleAllocator {
        &self.allocator
    }

    /// Number of live models.
    pub fn model_count(&self) -> usize {
        self.store.len()
    }
}
