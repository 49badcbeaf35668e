//! The SNES, or Super Famicom. Everything is a digital button.

use super::ButtonCode;

pub const VALID_INPUTS: &[&str] = &[
    "up", "down", "left", "right",
    "a", "b", "x", "y", "l", "r",
    "select", "start",
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
        "select" => 9,
        "start" => 10,
        "x" => 31,
        "y" => 32,
        _ => return None,
    };
    Some(ButtonCode(code))
}
