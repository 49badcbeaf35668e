use std::error::Error;

use crate::console::{is_wait, Axis, ButtonCode, ConsoleKind};
use crate::input::controller::memory::MemoryController;
use crate::input::controller::tracker::InputTracker;
use crate::input::controller::{
    AxisRange, AxisRest, ButtonState, ControllerState, StateChange, VirtualController,
};
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

fn new_state() -> ControllerState {
    ControllerState::new(ControllerState::default_ranges())
}

#[tokio::test]
async fn test_axis_range_midpoints() -> Result<(), Box<dyn Error>> {
    let range = AxisRange {
        min: 0,
        max: 32768,
        rest: AxisRest::Mid,
    };
    assert_eq!(range.mid(), 16384);
    assert_eq!(range.rest_value(), 16384);

    // Asymmetric ranges round toward the minimum
    let range = AxisRange {
        min: -32768,
        max: 32767,
        rest: AxisRest::Mid,
    };
    assert_eq!(range.mid(), -1);

    let trigger = AxisRange {
        min: 0,
        max: 255,
        rest: AxisRest::Min,
    };
    assert_eq!(trigger.rest_value(), 0);
    Ok(())
}

#[tokio::test]
async fn test_state_starts_at_rest() -> Result<(), Box<dyn Error>> {
    let state = new_state();
    assert_eq!(state.axis_value(Axis::X), 16384);
    assert_eq!(state.axis_value(Axis::Y), 16384);
    // Triggers rest at their minimum
    assert_eq!(state.axis_value(Axis::Z), 0);
    assert_eq!(state.axis_value(Axis::Rz), 0);
    assert_eq!(state.button_state(ButtonCode(1)), ButtonState::Released);
    Ok(())
}

#[tokio::test]
async fn test_commit_returns_differences_once() -> Result<(), Box<dyn Error>> {
    let mut state = new_state();
    state.press_input(ConsoleKind::GameCube, &input("a", 100));

    // Nothing is visible until the commit point
    assert_eq!(state.button_state(ButtonCode(5)), ButtonState::Released);

    let changes = state.commit();
    assert!(changes.contains(&StateChange::Button(ButtonCode(5), ButtonState::Pressed)));
    assert_eq!(state.button_state(ButtonCode(5)), ButtonState::Pressed);

    // A second commit with no new presses has nothing to flush
    assert!(state.commit().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_stick_axis_math() -> Result<(), Box<dyn Error>> {
    let mut state = new_state();

    state.press_axis(Axis::X, false, 100);
    state.commit();
    assert_eq!(state.axis_value(Axis::X), 32768);

    state.press_axis(Axis::X, true, 100);
    state.commit();
    assert_eq!(state.axis_value(Axis::X), 0);

    state.press_axis(Axis::X, false, 50);
    state.commit();
    assert_eq!(state.axis_value(Axis::X), 24576);

    state.release_axis(Axis::X);
    state.commit();
    assert_eq!(state.axis_value(Axis::X), 16384);
    Ok(())
}

#[tokio::test]
async fn test_absolute_axis_math() -> Result<(), Box<dyn Error>> {
    let mut state = new_state();

    state.press_absolute_axis(Axis::Z, 50);
    state.commit();
    assert_eq!(state.axis_value(Axis::Z), 16384);

    state.press_absolute_axis(Axis::Z, 100);
    state.commit();
    assert_eq!(state.axis_value(Axis::Z), 32768);

    state.release_absolute_axis(Axis::Z);
    state.commit();
    assert_eq!(state.axis_value(Axis::Z), 0);
    Ok(())
}

#[tokio::test]
async fn test_gamecube_trigger_duality() -> Result<(), Box<dyn Error>> {
    let console = ConsoleKind::GameCube;
    let mut state = new_state();

    // A soft press drives the analog axis and keeps the click released
    state.press_input(console, &input("l", 50));
    state.commit();
    assert_eq!(state.axis_value(Axis::Rz), 16384);
    assert_eq!(state.button_state(ButtonCode(7)), ButtonState::Released);

    // A full press clicks the button and lets the axis go
    state.press_input(console, &input("l", 100));
    state.commit();
    assert_eq!(state.axis_value(Axis::Rz), 0);
    assert_eq!(state.button_state(ButtonCode(7)), ButtonState::Pressed);

    state.release_input(console, &input("l", 100));
    state.commit();
    assert_eq!(state.button_state(ButtonCode(7)), ButtonState::Released);
    assert_eq!(state.axis_value(Axis::Rz), 0);
    Ok(())
}

#[tokio::test]
async fn test_press_release_round_trip_is_neutral() -> Result<(), Box<dyn Error>> {
    let console = ConsoleKind::GameCube;
    let mut state = new_state();

    for percent in [100, 50] {
        for name in console.valid_inputs() {
            if is_wait(name) {
                continue;
            }
            state.press_input(console, &input(name, percent));
            state.commit();
            state.release_input(console, &input(name, percent));
            state.commit();
        }
    }

    for code in 1..=32 {
        assert_eq!(state.button_state(ButtonCode(code)), ButtonState::Released);
    }
    for axis in [Axis::X, Axis::Y, Axis::Rx, Axis::Ry] {
        assert_eq!(state.axis_value(axis), 16384, "{axis:?} not at rest");
    }
    for axis in [Axis::Z, Axis::Rz] {
        assert_eq!(state.axis_value(axis), 0, "{axis:?} not at rest");
    }
    Ok(())
}

#[tokio::test]
async fn test_memory_controller_flushes_batches() -> Result<(), Box<dyn Error>> {
    let mut controller = MemoryController::new();
    controller.press_input(ConsoleKind::GameCube, &input("a", 100));
    controller.press_input(ConsoleKind::GameCube, &input("b", 100));
    controller.commit()?;

    // Both presses land in one flushed batch
    assert_eq!(controller.emitted().len(), 2);

    // Committing with nothing pending flushes nothing
    controller.commit()?;
    assert_eq!(controller.emitted().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_reset_flushes_full_neutral_state() -> Result<(), Box<dyn Error>> {
    let mut controller = MemoryController::new();
    controller.press_input(ConsoleKind::GameCube, &input("a", 100));
    controller.commit()?;

    let before = controller.emitted().len();
    controller.reset()?;

    // One button plus every axis, differences or not
    assert_eq!(controller.emitted().len(), before + 7);
    assert_eq!(
        controller.state().button_state(ButtonCode(5)),
        ButtonState::Released
    );
    assert_eq!(controller.state().axis_value(Axis::X), 16384);
    Ok(())
}

#[tokio::test]
async fn test_tracker_commits_in_lockstep() -> Result<(), Box<dyn Error>> {
    let tracker = InputTracker::new();
    tracker.press("a");

    // Pending presses are invisible until committed
    assert_eq!(tracker.input_state("a"), ButtonState::Released);
    tracker.commit();
    assert_eq!(tracker.input_state("a"), ButtonState::Pressed);
    assert!(tracker.pressed_inputs().contains("a"));

    // Clones share state
    let shared = tracker.clone();
    shared.release("a");
    shared.commit();
    assert!(tracker.pressed_inputs().is_empty());

    tracker.press("b");
    tracker.reset();
    tracker.commit();
    assert!(tracker.pressed_inputs().is_empty());
    Ok(())
}
