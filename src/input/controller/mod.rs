//! Virtual controller abstraction.
//!
//! [ControllerState] owns the classification and axis math shared by every
//! backend and double buffers all of it: presses and releases land in a
//! pending buffer that only reaches the committed buffer (and the device)
//! at commit points, so a batch of simultaneous inputs becomes one device
//! update. Backends implement [VirtualController::emit] to flush committed
//! changes to whatever they drive.

pub mod memory;
pub mod tracker;
pub mod uinput;

#[cfg(test)]
pub mod mod_test;

use std::collections::HashMap;

use thiserror::Error;

use crate::console::{Axis, ButtonCode, ConsoleKind};
use crate::parser::Input;

/// Possible errors from a virtual controller backend
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Failed to write to virtual device: {0}")]
    WriteError(#[from] std::io::Error),
}

/// Pressed state of a single button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Released,
    Pressed,
}

/// Which value an axis returns to when nothing drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRest {
    /// Sticks rest at their midpoint.
    Mid,
    /// Analog triggers rest fully released at their minimum.
    Min,
}

/// Value range of one axis and where it rests when neutral.
#[derive(Debug, Clone, Copy)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
    pub rest: AxisRest,
}

impl AxisRange {
    /// Midpoint of the range, rounded toward the minimum.
    pub fn mid(&self) -> i32 {
        let half = (self.max as i64 - self.min as i64) / 2;
        (self.min as i64 + half) as i32
    }

    pub fn rest_value(&self) -> i32 {
        match self.rest {
            AxisRest::Mid => self.mid(),
            AxisRest::Min => self.min,
        }
    }
}

/// One committed difference for a backend to flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Button(ButtonCode, ButtonState),
    Axis(Axis, i32),
}

/// Double-buffered controller state.
///
/// All mutation lands in the pending buffers; [ControllerState::commit]
/// swaps pending into committed and returns the differences. Reads go
/// against the committed side, so mid-batch state never leaks out.
#[derive(Debug, Clone)]
pub struct ControllerState {
    ranges: HashMap<Axis, AxisRange>,
    pending_buttons: HashMap<ButtonCode, ButtonState>,
    committed_buttons: HashMap<ButtonCode, ButtonState>,
    pending_axes: HashMap<Axis, i32>,
    committed_axes: HashMap<Axis, i32>,
}

impl ControllerState {
    pub fn new(ranges: HashMap<Axis, AxisRange>) -> Self {
        let axes: HashMap<Axis, i32> = ranges
            .iter()
            .map(|(axis, range)| (*axis, range.rest_value()))
            .collect();
        Self {
            ranges,
            pending_buttons: HashMap::new(),
            committed_buttons: HashMap::new(),
            pending_axes: axes.clone(),
            committed_axes: axes,
        }
    }

    /// Symmetric 0..32768 ranges for backends with no device-imposed
    /// geometry, with triggers resting at the minimum.
    pub fn default_ranges() -> HashMap<Axis, AxisRange> {
        Axis::all()
            .iter()
            .map(|axis| {
                let rest = match axis {
                    Axis::Z | Axis::Rz => AxisRest::Min,
                    _ => AxisRest::Mid,
                };
                (
                    *axis,
                    AxisRange {
                        min: 0,
                        max: 32768,
                        rest,
                    },
                )
            })
            .collect()
    }

    /// Apply a press to the pending state, classifying the input the way
    /// the console profile dictates.
    pub fn press_input(&mut self, console: ConsoleKind, input: &Input) {
        if console.is_absolute_axis(input) {
            if let Some(axis) = console.axis_code(&input.name) {
                self.press_absolute_axis(axis, input.percent);
            }
            // Partially pressing an analog trigger lifts its click button.
            if let Some(code) = console.button_code(&input.name) {
                self.release_button(code);
            }
        } else if let Some(axis) = console.axis(input) {
            self.press_axis(axis, console.is_min_axis(&input.name), input.percent);
        } else if console.is_button(input) {
            if let Some(code) = console.button_code(&input.name) {
                self.press_button(code);
            }
            // Fully pressing a trigger click lifts the analog axis.
            if let Some(axis) = console.axis_code(&input.name) {
                self.release_absolute_axis(axis);
            }
        }
    }

    /// Apply a release to the pending state. Mirrors [Self::press_input].
    pub fn release_input(&mut self, console: ConsoleKind, input: &Input) {
        if console.is_absolute_axis(input) {
            if let Some(axis) = console.axis_code(&input.name) {
                self.release_absolute_axis(axis);
            }
            if let Some(code) = console.button_code(&input.name) {
                self.release_button(code);
            }
        } else if let Some(axis) = console.axis(input) {
            self.release_axis(axis);
        } else if console.is_button(input) {
            if let Some(code) = console.button_code(&input.name) {
                self.release_button(code);
            }
            if let Some(axis) = console.axis_code(&input.name) {
                self.release_absolute_axis(axis);
            }
        }
    }

    pub fn press_button(&mut self, code: ButtonCode) {
        self.pending_buttons.insert(code, ButtonState::Pressed);
    }

    pub fn release_button(&mut self, code: ButtonCode) {
        self.pending_buttons.insert(code, ButtonState::Released);
    }

    /// Deflect a stick axis away from its midpoint by a percentage of the
    /// half range, toward the minimum or maximum end.
    pub fn press_axis(&mut self, axis: Axis, toward_min: bool, percent: u32) {
        let Some(range) = self.ranges.get(&axis) else {
            return;
        };
        let half = (range.max as i64 - range.min as i64) / 2;
        let mid = range.min as i64 + half;
        let offset = ((percent as f32 / 100.0) * half as f32) as i64;
        let value = if toward_min { mid - offset } else { mid + offset };
        self.pending_axes.insert(axis, value as i32);
    }

    pub fn release_axis(&mut self, axis: Axis) {
        let Some(range) = self.ranges.get(&axis) else {
            return;
        };
        self.pending_axes.insert(axis, range.mid());
    }

    /// Push an absolute axis up to a percentage of its maximum.
    pub fn press_absolute_axis(&mut self, axis: Axis, percent: u32) {
        let Some(range) = self.ranges.get(&axis) else {
            return;
        };
        let value = (range.max as f32 * (percent as f32 / 100.0)) as i32;
        self.pending_axes.insert(axis, value);
    }

    pub fn release_absolute_axis(&mut self, axis: Axis) {
        let Some(range) = self.ranges.get(&axis) else {
            return;
        };
        self.pending_axes.insert(axis, range.min);
    }

    /// Committed state of a button.
    pub fn button_state(&self, code: ButtonCode) -> ButtonState {
        self.committed_buttons.get(&code).copied().unwrap_or_default()
    }

    /// Committed value of an axis.
    pub fn axis_value(&self, axis: Axis) -> i32 {
        self.committed_axes.get(&axis).copied().unwrap_or(0)
    }

    /// Swap pending state into the committed buffers, returning every
    /// difference so the backend can flush the batch in one update.
    pub fn commit(&mut self) -> Vec<StateChange> {
        let mut changes = Vec::new();
        for (code, state) in self.pending_buttons.iter() {
            if self.committed_buttons.get(code).copied().unwrap_or_default() != *state {
                changes.push(StateChange::Button(*code, *state));
            }
        }
        for (axis, value) in self.pending_axes.iter() {
            if self.committed_axes.get(axis) != Some(value) {
                changes.push(StateChange::Axis(*axis, *value));
            }
        }
        self.committed_buttons.clone_from(&self.pending_buttons);
        self.committed_axes.clone_from(&self.pending_axes);
        changes
    }

    /// Return every control to neutral and commit. Unlike [Self::commit]
    /// this returns the full neutral state, not just differences, so a
    /// freshly created device also receives its rest values.
    pub fn reset(&mut self) -> Vec<StateChange> {
        let mut changes = Vec::new();
        for (code, state) in self.pending_buttons.iter_mut() {
            *state = ButtonState::Released;
            changes.push(StateChange::Button(*code, ButtonState::Released));
        }
        for (axis, range) in self.ranges.iter() {
            let value = range.rest_value();
            self.pending_axes.insert(*axis, value);
            changes.push(StateChange::Axis(*axis, value));
        }
        self.committed_buttons.clone_from(&self.pending_buttons);
        self.committed_axes.clone_from(&self.pending_axes);
        changes
    }
}

/// A virtual controller device.
///
/// Backends hold a [ControllerState] and flush committed changes in
/// [VirtualController::emit]; the press/release/commit plumbing is shared
/// through the provided methods.
pub trait VirtualController: Send {
    fn state(&self) -> &ControllerState;
    fn state_mut(&mut self) -> &mut ControllerState;

    /// Flush a batch of committed changes to the underlying device.
    fn emit(&mut self, changes: &[StateChange]) -> Result<(), ControllerError>;

    fn press_input(&mut self, console: ConsoleKind, input: &Input) {
        self.state_mut().press_input(console, input);
    }

    fn release_input(&mut self, console: ConsoleKind, input: &Input) {
        self.state_mut().release_input(console, input);
    }

    /// Commit pending state and flush the differences to the device.
    fn commit(&mut self) -> Result<(), ControllerError> {
        let changes = self.state_mut().commit();
        if changes.is_empty() {
            return Ok(());
        }
        self.emit(&changes)
    }

    /// Return every control to neutral and flush the full neutral state.
    fn reset(&mut self) -> Result<(), ControllerError> {
        let changes = self.state_mut().reset();
        if changes.is_empty() {
            return Ok(());
        }
        self.emit(&changes)
    }
}
