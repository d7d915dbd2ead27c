//! Handle → model mapping.
//!
//! Models are kept in creation order so a snapshot replays them the
//! way they appeared. Removing a model keeps the relative order of
//! the others.

use indexmap::IndexMap;

use crate::model::Model;

/// The authoritative set of live models, keyed by unique handle.
#[derive(Debug, Default)]
pub struct SceneStore {
    models: IndexMap<String, Model>,
}

impl SceneStore {
    pub fn new() -> Self {
        SceneStore::default()
    }

    pub fn get(&self, handle: &str) -> Option<&Model> {
        self.models.get(handle)
    }

    pub fn get_mut(&mut self, handle: &str) -> Option<&mut Model> {
        self.models.get_mut(handle)
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.models.contains_key(handle)
    }

    /// Insert or replace the model stored under `handle`.
    ///
    /// Returns the previous model, if any. A replaced model keeps its
    /// original position in creation order.
    pub fn put(&mut self, handle: impl Into<String>, model: Model) -> Option<Model> {
        self.models.insert(handle.into(), model)
    }

    /// Remove and return the model stored under `handle`.
    pub fn delete(&mut self, handle: &str) -> Option<Model> {
        self.models.shift_remove(handle)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Borrowing iterator over `(handle, model)` in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Model)> {
        self.models.iter().map(|(h, m)| (h.as_str(), m))
    }

    /// Owned copy of the whole store, in creation order.
    pub fn snapshot(&self) -> Vec<(String, Model)> {
        self.models
            .iter()
            .map(|(h, m)| (h.clone(), m.clone()))
            .collect()
    }
}
