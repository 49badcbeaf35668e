//! The Nintendo 64. The analog stick maps to the X/Y axes; the C buttons
//! and D-pad are digital.

use super::{Axis, ButtonCode};

pub const VALID_INPUTS: &[&str] = &[
    "left", "right", "up", "down",
    "dleft", "dright", "dup", "ddown",
    "cleft", "cright", "cup", "cdown",
    "a", "b", "l", "r", "z",
    "start",
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
        _ => return None,
    };
    Some(ButtonCode(code))
}

pub fn axis_code(name: &str) -> Option<Axis> {
    match name {
        "left" | "right" => Some(Axis::X),
        "up" | "down" => Some(Axis::Y),
        _ => None,
    }
}

pub fn is_min_axis(name: &str) -> bool {
    name == "left" || name == "up"
}
