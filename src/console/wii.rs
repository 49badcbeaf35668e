//! The Nintendo Wii, in Remote + Nunchuk mode. The nunchuk stick maps to
//! X/Y, pointer movement to Z/RZ, and tilt to RX/RY. More named inputs
//! than buttons exist, so several names share a button number.

use super::{Axis, ButtonCode};

pub const VALID_INPUTS: &[&str] = &[
    "left", "right", "up", "down",
    "pleft", "pright", "pup", "pdown",
    "tleft", "tright", "tforward", "tback",
    "dleft", "dright", "dup", "ddown",
    "a", "b", "one", "two", "minus", "plus",
    "c", "z",
    "shake", "point",
    "ss1", "ss2", "ss3", "ss4", "ss5", "ss6",
    "ls1", "ls2", "ls3", "ls4", "ls5", "ls6",
    "#", ".",
];

pub fn button_code(name: &str) -> Option<ButtonCode> {
    let code = match name {
        "left" | "c" => 1,
        "right" | "z" => 2,
        "up" | "tleft" => 3,
        "down" | "tright" => 4,
        "a" => 5,
        "b" => 6,
        "one" => 7,
        "two" => 8,
        "minus" => 9,
        "plus" => 10,
        "pleft" => 11,
        "pright" => 12,
        "pup" => 13,
        "pdown" => 14,
        "dleft" => 15,
        "dright" => 16,
        "dup" => 17,
        "ddown" => 18,
        "ss1" | "tforward" => 19,
        "ss2" | "tback" => 20,
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
        "shake" => 31,
        "point" => 32,
        _ => return None,
    };
    Some(ButtonCode(code))
}

pub fn axis_code(name: &str) -> Option<Axis> {
    match name {
        "left" | "right" => Some(Axis::X),
        "up" | "down" => Some(Axis::Y),
        "tleft" | "tright" => Some(Axis::Rx),
        "tforward" | "tback" => Some(Axis::Ry),
        "pleft" | "pright" => Some(Axis::Rz),
        "pup" | "pdown" => Some(Axis::Z),
        _ => None,
    }
}

pub fn is_min_axis(name: &str) -> bool {
    name == "left"
        || name == "up"
        || name == "tleft"
        || name == "tforward"
        || name == "pleft"
        || name == "pup"
}
