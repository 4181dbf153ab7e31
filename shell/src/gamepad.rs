//! Joystick collaborator: a restartable per-iteration event drain
//!
//! Each iteration the poller yields the finite set of pending gamepad
//! events as [`PadEvent`]s. A missing or failed gamepad subsystem yields an
//! empty drain forever; the loop degrades to keyboard-only input.

use kiln_core::PadEvent;

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

/// Polls the gamepad subsystem once per loop iteration.
pub struct GamepadPoller {
    /// Gilrs context (None if initialization failed or gamepad feature disabled)
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
}

#[cfg(feature = "gamepad")]
impl GamepadPoller {
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => Some(gilrs),
            Err(err) => {
                tracing::warn!(
                    "Failed to initialize gamepad support: {}. Gamepads will not be available.",
                    err
                );
                None
            }
        };
        Self { gilrs }
    }

    /// Drain all pending events into `sink`. Never blocks.
    pub fn poll(&mut self, mut sink: impl FnMut(PadEvent)) {
        let Some(gilrs) = &mut self.gilrs else {
            return;
        };
        while let Some(event) = gilrs.next_event() {
            match event.event {
                EventType::ButtonPressed(button, _) => {
                    if let Some(index) = button_index(button) {
                        sink(PadEvent::Button { index, pressed: true });
                    }
                }
                EventType::ButtonReleased(button, _) => {
                    if let Some(index) = button_index(button) {
                        sink(PadEvent::Button { index, pressed: false });
                    }
                }
                EventType::AxisChanged(axis, value, _) => {
                    if let Some((index, raw)) = axis_event(axis, value) {
                        sink(PadEvent::Axis { index, value: raw });
                    }
                }
                EventType::Connected => {
                    tracing::info!("Gamepad {} connected", event.id);
                }
                EventType::Disconnected => {
                    tracing::info!("Gamepad {} disconnected", event.id);
                }
                _ => {}
            }
        }
    }
}

#[cfg(not(feature = "gamepad"))]
impl GamepadPoller {
    pub fn new() -> Self {
        Self {}
    }

    /// Keyboard-only build: the drain is always empty.
    pub fn poll(&mut self, _sink: impl FnMut(PadEvent)) {}
}

impl Default for GamepadPoller {
    fn default() -> Self {
        Self::new()
    }
}

/// Map gilrs buttons onto the Linux joystick button indexes the reducer
/// expects.
#[cfg(feature = "gamepad")]
fn button_index(button: Button) -> Option<u8> {
    match button {
        Button::South => Some(0),
        Button::East => Some(1),
        Button::West => Some(2),
        Button::North => Some(3),
        Button::Select => Some(6),
        Button::Start => Some(7),
        _ => None,
    }
}

/// Convert a normalized gilrs axis to raw signed 16-bit device units.
///
/// Gilrs reports stick up as positive; the reducer follows the device
/// convention where up is negative, so the vertical axis flips sign.
#[cfg(feature = "gamepad")]
fn axis_event(axis: Axis, value: f32) -> Option<(u8, i16)> {
    let (index, oriented) = match axis {
        Axis::LeftStickX => (0, value),
        Axis::LeftStickY => (1, -value),
        _ => return None,
    };
    Some((index, (oriented * 32767.0).clamp(-32768.0, 32767.0) as i16))
}
