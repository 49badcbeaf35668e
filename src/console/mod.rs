//! Console input profiles.
//!
//! Each console defines which input names chat can use, how those names map
//! onto virtual controller buttons and axes, and any console-specific
//! classification quirks (e.g. GameCube analog triggers). Profiles are pure
//! lookup tables; nothing here touches a device.

pub mod gamecube;
pub mod n64;
pub mod snes;
pub mod wii;

#[cfg(test)]
pub mod mod_test;

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::parser::Input;

/// Identifier for a numbered virtual controller button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ButtonCode(pub u16);

impl Display for ButtonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "button {}", self.0)
    }
}

/// Axes available on a virtual controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
}

impl Axis {
    pub fn all() -> &'static [Axis] {
        &[Axis::X, Axis::Y, Axis::Z, Axis::Rx, Axis::Ry, Axis::Rz]
    }
}

/// Returns true if the name is a wait input, which consumes time in a
/// sequence without touching the controller.
pub fn is_wait(name: &str) -> bool {
    name == "#" || name == "."
}

/// The consoles input sequences can be parsed and executed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleKind {
    Snes,
    N64,
    #[default]
    #[serde(alias = "gc")]
    GameCube,
    Wii,
}

impl ConsoleKind {
    /// All selectable consoles.
    pub fn all() -> &'static [ConsoleKind] {
        &[
            ConsoleKind::Snes,
            ConsoleKind::N64,
            ConsoleKind::GameCube,
            ConsoleKind::Wii,
        ]
    }

    /// Parse an operator-facing console tag (e.g. "gc", "snes").
    pub fn from_tag(tag: &str) -> Option<ConsoleKind> {
        match tag.to_lowercase().as_str() {
            "snes" => Some(ConsoleKind::Snes),
            "n64" => Some(ConsoleKind::N64),
            "gc" | "gamecube" => Some(ConsoleKind::GameCube),
            "wii" => Some(ConsoleKind::Wii),
            _ => None,
        }
    }

    /// All input names this console accepts, including the wait inputs.
    pub fn valid_inputs(&self) -> &'static [&'static str] {
        match self {
            ConsoleKind::Snes => snes::VALID_INPUTS,
            ConsoleKind::N64 => n64::VALID_INPUTS,
            ConsoleKind::GameCube => gamecube::VALID_INPUTS,
            ConsoleKind::Wii => wii::VALID_INPUTS,
        }
    }

    /// Virtual button the input name maps to, if any.
    pub fn button_code(&self, name: &str) -> Option<ButtonCode> {
        match self {
            ConsoleKind::Snes => snes::button_code(name),
            ConsoleKind::N64 => n64::button_code(name),
            ConsoleKind::GameCube => gamecube::button_code(name),
            ConsoleKind::Wii => wii::button_code(name),
        }
    }

    /// Raw axis mapping for the input name, ignoring console special cases.
    pub fn axis_code(&self, name: &str) -> Option<Axis> {
        match self {
            ConsoleKind::Snes => None,
            ConsoleKind::N64 => n64::axis_code(name),
            ConsoleKind::GameCube => gamecube::axis_code(name),
            ConsoleKind::Wii => wii::axis_code(name),
        }
    }

    /// Axis the input actually drives, after console special cases.
    /// GameCube triggers only behave as axes for partial presses.
    pub fn axis(&self, input: &Input) -> Option<Axis> {
        match self {
            ConsoleKind::GameCube => gamecube::axis(input),
            _ => self.axis_code(&input.name),
        }
    }

    /// Whether the input behaves as an absolute axis: one that rests at
    /// zero and is pushed up to a value, like an analog trigger.
    pub fn is_absolute_axis(&self, input: &Input) -> bool {
        match self {
            ConsoleKind::GameCube => gamecube::is_absolute_axis(input),
            _ => false,
        }
    }

    /// Whether the input drives an axis for this console.
    pub fn is_axis(&self, input: &Input) -> bool {
        self.axis(input).is_some()
    }

    /// Whether the input drives its axis toward the minimum end.
    pub fn is_min_axis(&self, name: &str) -> bool {
        match self {
            ConsoleKind::Snes => false,
            ConsoleKind::N64 => n64::is_min_axis(name),
            ConsoleKind::GameCube => gamecube::is_min_axis(name),
            ConsoleKind::Wii => wii::is_min_axis(name),
        }
    }

    /// Whether the input is a plain button press for this console.
    pub fn is_button(&self, input: &Input) -> bool {
        !is_wait(&input.name) && !self.is_axis(input) && !self.is_absolute_axis(input)
    }
}

impl Display for ConsoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConsoleKind::Snes => "SNES",
            ConsoleKind::N64 => "N64",
            ConsoleKind::GameCube => "GameCube",
            ConsoleKind::Wii => "Wii",
        };
        write!(f, "{name}")
    }
}
