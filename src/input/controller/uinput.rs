//! Uinput controller backend.
//!
//! Exposes each controller slot as a virtual gamepad with 32 numbered
//! buttons, two sticks, and two analog triggers, covering every mapping the
//! console profiles produce.

use std::collections::HashMap;

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisCode, AttributeSet, EventType, InputEvent, KeyCode,
    SynchronizationCode, SynchronizationEvent, UinputAbsSetup,
};

use crate::console::{Axis, ButtonCode};
use crate::constants::CONTROLLER_NAME;

use super::{
    AxisRange, AxisRest, ButtonState, ControllerError, ControllerState, StateChange,
    VirtualController,
};

/// Numbered buttons each virtual controller exposes
const BUTTON_COUNT: u16 = 32;

/// A uinput-backed virtual gamepad.
pub struct UinputController {
    device: VirtualDevice,
    state: ControllerState,
}

impl UinputController {
    /// Create and register the virtual device for controller slot `index`.
    pub fn new(index: usize) -> Result<UinputController, ControllerError> {
        let name = format!("{CONTROLLER_NAME} {index}");
        log::debug!("Creating virtual gamepad: {name}");
        let device = UinputController::create_virtual_device(&name)?;
        let state = ControllerState::new(UinputController::axis_ranges());
        Ok(Self { device, state })
    }

    fn axis_ranges() -> HashMap<Axis, AxisRange> {
        let stick = AxisRange {
            min: -32768,
            max: 32767,
            rest: AxisRest::Mid,
        };
        let trigger = AxisRange {
            min: 0,
            max: 255,
            rest: AxisRest::Min,
        };
        HashMap::from([
            (Axis::X, stick),
            (Axis::Y, stick),
            (Axis::Rx, stick),
            (Axis::Ry, stick),
            (Axis::Z, trigger),
            (Axis::Rz, trigger),
        ])
    }

    /// Create the virtual device to emulate
    fn create_virtual_device(name: &str) -> Result<VirtualDevice, ControllerError> {
        // Setup Key inputs
        let mut keys = AttributeSet::<KeyCode>::new();
        for number in 1..=BUTTON_COUNT {
            keys.insert(key_for_button(ButtonCode(number)));
        }

        // Setup ABS inputs
        let joystick_setup = AbsInfo::new(0, -32768, 32767, 16, 128, 1);
        let abs_x = UinputAbsSetup::new(AbsoluteAxisCode::ABS_X, joystick_setup);
        let abs_y = UinputAbsSetup::new(AbsoluteAxisCode::ABS_Y, joystick_setup);
        let abs_rx = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RX, joystick_setup);
        let abs_ry = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RY, joystick_setup);
        let triggers_setup = AbsInfo::new(0, 0, 255, 0, 0, 1);
        let abs_z = UinputAbsSetup::new(AbsoluteAxisCode::ABS_Z, triggers_setup);
        let abs_rz = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RZ, triggers_setup);

        // Build the device
        let device = VirtualDeviceBuilder::new()?
            .name(name)
            .with_keys(&keys)?
            .with_absolute_axis(&abs_x)?
            .with_absolute_axis(&abs_y)?
            .with_absolute_axis(&abs_rx)?
            .with_absolute_axis(&abs_ry)?
            .with_absolute_axis(&abs_z)?
            .with_absolute_axis(&abs_rz)?
            .build()?;

        Ok(device)
    }
}

impl VirtualController for UinputController {
    fn state(&self) -> &ControllerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    fn emit(&mut self, changes: &[StateChange]) -> Result<(), ControllerError> {
        let mut events = Vec::with_capacity(changes.len());
        for change in changes {
            let event = match change {
                StateChange::Button(code, state) => {
                    let value = match state {
                        ButtonState::Pressed => 1,
                        ButtonState::Released => 0,
                    };
                    InputEvent::new(EventType::KEY.0, key_for_button(*code).0, value)
                }
                StateChange::Axis(axis, value) => {
                    InputEvent::new(EventType::ABSOLUTE.0, abs_code(*axis).0, *value)
                }
            };
            events.push(event);
        }
        self.device.emit(events.as_slice())?;
        self.device
            .emit(&[SynchronizationEvent::new(SynchronizationCode::SYN_REPORT, 0).into()])?;
        Ok(())
    }
}

/// Maps numbered buttons onto the joystick key range: the first 16 take
/// BTN_TRIGGER..BTN_DEAD and the rest continue at BTN_TRIGGER_HAPPY1.
fn key_for_button(code: ButtonCode) -> KeyCode {
    let index = code.0.saturating_sub(1);
    if index < 16 {
        KeyCode::new(KeyCode::BTN_TRIGGER.0 + index)
    } else {
        KeyCode::new(KeyCode::BTN_TRIGGER_HAPPY1.0 + (index - 16))
    }
}

fn abs_code(axis: Axis) -> AbsoluteAxisCode {
    match axis {
        Axis::X => AbsoluteAxisCode::ABS_X,
        Axis::Y => AbsoluteAxisCode::ABS_Y,
        Axis::Z => AbsoluteAxisCode::ABS_Z,
        Axis::Rx => AbsoluteAxisCode::ABS_RX,
        Axis::Ry => AbsoluteAxisCode::ABS_RY,
        Axis::Rz => AbsoluteAxisCode::ABS_RZ,
    }
}
