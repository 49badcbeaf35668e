use std::collections::HashSet;
use std::error::Error;

use crate::console::{is_wait, Axis, ButtonCode, ConsoleKind};
use crate::parser::Input;

fn input(name: &str, percent: u32) -> Input {
    Input {
        name: name.to_string(),
        hold: false,
        release: false,
        percent,
        duration_ms: 200,
    }
}

#[tokio::test]
async fn test_from_tag() -> Result<(), Box<dyn Error>> {
    assert_eq!(ConsoleKind::from_tag("snes"), Some(ConsoleKind::Snes));
    assert_eq!(ConsoleKind::from_tag("n64"), Some(ConsoleKind::N64));
    assert_eq!(ConsoleKind::from_tag("gc"), Some(ConsoleKind::GameCube));
    assert_eq!(
        ConsoleKind::from_tag("GameCube"),
        Some(ConsoleKind::GameCube)
    );
    assert_eq!(ConsoleKind::from_tag("WII"), Some(ConsoleKind::Wii));
    assert_eq!(ConsoleKind::from_tag("atari"), None);
    Ok(())
}

#[tokio::test]
async fn test_wait_inputs_on_every_console() -> Result<(), Box<dyn Error>> {
    assert!(is_wait("#"));
    assert!(is_wait("."));
    assert!(!is_wait("a"));

    for console in ConsoleKind::all() {
        let inputs = console.valid_inputs();
        assert!(inputs.contains(&"#"), "{console} is missing '#'");
        assert!(inputs.contains(&"."), "{console} is missing '.'");
        // Waits are neither buttons nor axes
        assert!(!console.is_button(&input("#", 100)));
        assert!(!console.is_axis(&input(".", 100)));
    }
    Ok(())
}

#[tokio::test]
async fn test_every_input_maps_somewhere() -> Result<(), Box<dyn Error>> {
    for console in ConsoleKind::all() {
        for name in console.valid_inputs() {
            if is_wait(name) {
                continue;
            }
            let mapped =
                console.button_code(name).is_some() || console.axis_code(name).is_some();
            assert!(mapped, "{console} input \"{name}\" maps to nothing");
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_snes_is_all_buttons() -> Result<(), Box<dyn Error>> {
    let console = ConsoleKind::Snes;
    for name in console.valid_inputs() {
        if is_wait(name) {
            continue;
        }
        let press = input(name, 100);
        assert!(console.is_button(&press));
        assert!(!console.is_axis(&press));
        assert!(!console.is_absolute_axis(&press));
    }
    Ok(())
}

#[tokio::test]
async fn test_n64_stick_axes() -> Result<(), Box<dyn Error>> {
    let console = ConsoleKind::N64;
    assert_eq!(console.axis(&input("left", 100)), Some(Axis::X));
    assert_eq!(console.axis(&input("right", 100)), Some(Axis::X));
    assert_eq!(console.axis(&input("up", 100)), Some(Axis::Y));
    assert!(console.is_min_axis("left"));
    assert!(console.is_min_axis("up"));
    assert!(!console.is_min_axis("right"));

    // An input with an axis mapping is not a button
    assert!(!console.is_button(&input("left", 100)));
    // The D-pad stays digital
    assert!(console.is_button(&input("dleft", 100)));
    assert_eq!(console.axis(&input("dleft", 100)), None);
    Ok(())
}

#[tokio::test]
async fn test_gamecube_trigger_duality() -> Result<(), Box<dyn Error>> {
    let console = ConsoleKind::GameCube;

    // Full presses act as digital trigger clicks
    let full = input("l", 100);
    assert!(console.is_button(&full));
    assert!(!console.is_absolute_axis(&full));
    assert_eq!(console.axis(&full), None);

    // Partial presses drive the analog axis instead
    let soft = input("l", 50);
    assert!(!console.is_button(&soft));
    assert!(console.is_absolute_axis(&soft));
    assert_eq!(console.axis_code(&soft.name), Some(Axis::Rz));
    assert_eq!(console.axis_code("r"), Some(Axis::Z));
    Ok(())
}

#[tokio::test]
async fn test_button_codes_unique_where_expected() -> Result<(), Box<dyn Error>> {
    // SNES, N64 and GameCube give every input its own button. The Wii
    // has more named inputs than buttons and shares codes deliberately.
    for console in [ConsoleKind::Snes, ConsoleKind::N64, ConsoleKind::GameCube] {
        let mut seen: HashSet<ButtonCode> = HashSet::new();
        for name in console.valid_inputs() {
            let Some(code) = console.button_code(name) else {
                continue;
            };
            assert!(seen.insert(code), "{console} reuses {code} for \"{name}\"");
        }
    }

    let wii = ConsoleKind::Wii;
    assert_eq!(wii.button_code("left"), wii.button_code("c"));
    Ok(())
}
