//! In-memory controller backend.
//!
//! Tracks full controller state without a device behind it. Used by tests
//! and by the `memory` backend setting for running the daemon on hosts
//! without uinput access.

use super::{ControllerError, ControllerState, StateChange, VirtualController};

/// A controller that records flushed changes instead of writing anywhere.
#[derive(Debug)]
pub struct MemoryController {
    state: ControllerState,
    emitted: Vec<StateChange>,
}

impl MemoryController {
    pub fn new() -> Self {
        Self {
            state: ControllerState::new(ControllerState::default_ranges()),
            emitted: Vec::new(),
        }
    }

    /// Every change flushed so far, in order.
    pub fn emitted(&self) -> &[StateChange] {
        &self.emitted
    }
}

impl Default for MemoryController {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualController for MemoryController {
    fn state(&self) -> &ControllerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    fn emit(&mut self, changes: &[StateChange]) -> Result<(), ControllerError> {
        log::trace!("Flushing {} state changes", changes.len());
        self.emitted.extend_from_slice(changes);
        Ok(())
    }
}
