//! Unique model handle generation with index reuse.
//!
//! A handle is `"{index} - {geometry}"`, e.g. `"0 - cube"`. Indices
//! freed by removals go into a FIFO reclaim queue and are handed out
//! again before any fresh index is used. When the scene empties, the
//! queue is dropped and numbering restarts at 0.
//!
//! Invariant (given every Create and Remove goes through this type):
//! live indices and queued indices are disjoint, and together they
//! cover `0..live + queued`. So with an empty queue the store size is
//! always the next unused index.

use std::collections::VecDeque;

use crate::error::SceneError;

/// Separator between the numeric index and the geometry label.
pub const HANDLE_DELIMITER: &str = " - ";

#[derive(Debug, Default)]
pub struct HandleAllocator {
    /// Indices freed by removals, oldest first.
    reclaimed: VecDeque<u64>,

    /// Number of handles issued since startup. Diagnostic only.
    issued: u64,
}

impl HandleAllocator {
    pub fn new() -> Self {
        HandleAllocator::default()
    }

    /// Produce a handle for a new model.
    ///
    /// `live_count` is the current size of the scene store and is used
    /// as the fresh index when nothing is waiting to be reused.
    pub fn allocate(&mut self, geometry_hint: &str, live_count: usize) -> String {
        let index = self
            .reclaimed
            .pop_front()
            .unwrap_or(live_count as u64);
        self.issued += 1;
        compose_handle(index, geometry_hint)
    }

    /// Return the index of a removed model for reuse.
    ///
    /// `store_now_empty` is the emptiness of the store *after* the
    /// removal; when true the whole queue is cleared instead and
    /// `Ok(None)` is returned. Otherwise the reclaimed index is
    /// returned.
    pub fn reclaim(
        &mut self,
        handle: &str,
        store_now_empty: bool,
    ) -> Result<Option<u64>, SceneError> {
        if store_now_empty {
            self.reclaimed.clear();
            return Ok(None);
        }

        let index = parse_index(handle)?;
        self.reclaimed.push_back(index);
        Ok(Some(index))
    }

    /// Indices currently waiting to be reused, oldest first.
    pub fn reclaimed(&self) -> impl Iterator<Item = u64> + '_ {
        self.reclaimed.iter().copied()
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }
}

/// Build `"{index} - {geometry}"`.
pub fn compose_handle(index: u64, geometry_hint: &str) -> String {
    format!("{index}{HANDLE_DELIMITER}{geometry_hint}")
}

/// Parse the full numeric prefix of a handle, up to the first delimiter.
///
/// `"12 - cube"` yields `12`.
pub fn parse_index(handle: &str) -> Result<u64, SceneError> {
    handle
        .split_once(HANDLE_DELIMITER)
        .and_then(|(prefix, _)| prefix.parse::<u64>().ok())
        .ok_or_else(|| SceneError::MalformedHandle(handle.to_string()))
}
