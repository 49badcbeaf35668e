//! The Nintendo GameCube.
//!
//! The L and R triggers are analog: pressed with a partial percent they
//! behave as absolute axes, at full percent they act as digital buttons.

use crate::parser::Input;

use super::{Axis, ButtonCode};

pub const VALID_INPUTS: &[&str] = &[
    "left", "right", "up", "down",
    "dleft", "dright", "dup", "ddown",
    "cleft", "cright", "cup", "cdown",
    "a", "b", "l", "r", "x", "y", "z",
    "start",
    "ss1", "ss2", "ss3", "ss4", "ss5", "ss6",
    "ls1", "ls2", "ls3", "ls4", "ls5", "ls6",
    "#", ".",
];

pub fn button_code(name: &str) -> Option<ButtonCode> {
    let code = match name {
        "left" => 1,
        "right" => 2,
        "up" => 3,
        "down" => 4,
        "a" => 5,
        "b" => 6,
        "l" => 7,
        "r" => 8,
        "z" => 9,
        "start" => 10,
        "cleft" => 11,
        "cright" => 12,
        "cup" => 13,
        "cdown" => 14,
        "dleft" => 15,
        "dright" => 16,
        "dup" => 17,
        "ddown" => 18,
        "ss1" => 19,
        "ss2" => 20,
        "ss3" => 21,
        "ss4" => 22,
        "ss5" => 23,
        "ss6" => 24,
        "ls1" => 25,
        "ls2" => 26,
        "ls3" => 27,
        "ls4" => 28,
        "ls5" => 29,
        "ls6" => 30,
        "x" => 31,
        "y" => 32,
        _ => return None,
    };
    Some(ButtonCode(code))
}

pub fn axis_code(name: &str) -> Option<Axis> {
    match name {
        "left" | "right" => Some(Axis::X),
        "up" | "down" => Some(Axis::Y),
        "cleft" | "cright" => Some(Axis::Rx),
        "cup" | "cdown" => Some(Axis::Ry),
        "l" => Some(Axis::Rz),
        "r" => Some(Axis::Z),
        _ => None,
    }
}

/// Triggers at full percent act as buttons, not axes.
pub fn axis(input: &Input) -> Option<Axis> {
    if (input.name == "l" || input.name == "r") && input.percent == 100 {
        return None;
    }
    axis_code(&input.name)
}

pub fn is_absolute_axis(input: &Input) -> bool {
    (input.name == "l" || input.name == "r") && input.percent != 100
}

pub fn is_min_axis(name: &str) -> bool {
    name == "left" || name == "up" || name == "cleft" || name == "cup"
}
