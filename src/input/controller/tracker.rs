//! Name-level shadow of what a controller is holding down.
//!
//! The engine that owns a device writes presses and releases here by input
//! name, committing in lockstep with the device, while validation reads
//! the committed side from other tasks to judge messages against what is
//! already held. Cloning is cheap; clones share the same state.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use super::ButtonState;

#[derive(Debug, Default)]
struct TrackerState {
    pending: HashMap<String, ButtonState>,
    committed: HashMap<String, ButtonState>,
}

/// Shared pressed/released state keyed by input name.
#[derive(Debug, Default, Clone)]
pub struct InputTracker {
    inner: Arc<RwLock<TrackerState>>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, name: &str) {
        let mut state = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        state.pending.insert(name.to_string(), ButtonState::Pressed);
    }

    pub fn release(&self, name: &str) {
        let mut state = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        state.pending.insert(name.to_string(), ButtonState::Released);
    }

    /// Make all pending presses and releases visible to readers.
    pub fn commit(&self) {
        let mut state = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let state = &mut *state;
        state.committed.clone_from(&state.pending);
    }

    /// Forget everything, pending and committed.
    pub fn reset(&self) {
        let mut state = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        state.pending.clear();
        state.committed.clear();
    }

    /// Committed state of a single input name.
    pub fn input_state(&self, name: &str) -> ButtonState {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state.committed.get(name).copied().unwrap_or_default()
    }

    /// Names of every input currently committed as pressed.
    pub fn pressed_inputs(&self) -> HashSet<String> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state
            .committed
            .iter()
            .filter(|(_, s)| **s == ButtonState::Pressed)
            .map(|(name, _)| name.clone())
            .collect()
    }
}
