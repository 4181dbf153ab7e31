//! Double-buffered event folding and edge detection

use super::{ButtonState, InputFrame, MERGED_SLOT, PadEvent, VirtualButton};

/// Raw axis units inside this band are treated as center drift and clamp
/// to zero (about 24% of full scale).
pub const DEAD_ZONE: i16 = 7849;

/// Full-scale raw axis magnitude.
pub const AXIS_LIMIT: f32 = 32767.0;

/// Normalized stick deflection at which a movement button is considered held.
const DIGITAL_THRESHOLD: f32 = 0.5;

/// Normalize a raw signed 16-bit axis value to `[-1.0, 1.0]`.
///
/// Values inside the dead zone map to 0; values outside are rescaled
/// linearly from the dead-zone edge so the output still spans the full
/// range. A value exactly at the dead-zone edge maps to 0.
pub fn normalize_axis(value: i16) -> f32 {
    let raw = f32::from(value);
    let dead = f32::from(DEAD_ZONE);
    if raw.abs() < dead {
        0.0
    } else if raw < 0.0 {
        ((raw + dead) / (AXIS_LIMIT - dead)).max(-1.0)
    } else {
        ((raw - dead) / (AXIS_LIMIT - dead)).min(1.0)
    }
}

/// Joystick-sourced edge detection: one edge per resolved value, compared
/// against the previous frame.
fn apply_pad_edge(old: &ButtonState, new: &mut ButtonState, pressed: bool) {
    new.ended_down = pressed;
    new.half_transition_count = u32::from(old.ended_down != pressed);
}

/// Folds raw device events into the writable half of a double-buffered
/// input frame pair.
///
/// Call order per iteration: [`begin_frame`](Self::begin_frame), then any
/// number of [`key_event`](Self::key_event) / [`pad_event`](Self::pad_event),
/// then read [`frame`](Self::frame), then [`end_frame`](Self::end_frame)
/// to swap roles.
#[derive(Debug, Default)]
pub struct InputReducer {
    frames: [InputFrame; 2],
    new_index: usize,
}

impl InputReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: the writable snapshot inherits the previous
    /// frame's held state with all transition counts zeroed.
    pub fn begin_frame(&mut self) {
        let (new, old) = self.new_old_mut();
        *new = *old;
        for controller in new.controllers.iter_mut() {
            for button in VirtualButton::ALL {
                controller.button_mut(button).half_transition_count = 0;
            }
        }
    }

    /// Apply a keyboard-sourced button event.
    ///
    /// Keyboard events are discrete and already debounced by the OS, so
    /// every observed event counts as an edge.
    pub fn key_event(&mut self, button: VirtualButton, pressed: bool) {
        let (new, _) = self.new_old_mut();
        let state = new.controllers[MERGED_SLOT].button_mut(button);
        state.ended_down = pressed;
        state.half_transition_count += 1;
    }

    /// Apply a raw joystick event.
    pub fn pad_event(&mut self, event: PadEvent) {
        match event {
            PadEvent::Button { index, pressed } => {
                let Some(button) = pad_button(index) else {
                    return;
                };
                let (new, old) = self.new_old_mut();
                let controller = &mut new.controllers[MERGED_SLOT];
                controller.is_analog = true;
                apply_pad_edge(
                    old.controllers[MERGED_SLOT].button(button),
                    controller.button_mut(button),
                    pressed,
                );
            }
            PadEvent::Axis { index, value } => {
                let norm = normalize_axis(value);
                let (new, old) = self.new_old_mut();
                let controller = &mut new.controllers[MERGED_SLOT];
                controller.is_analog = true;
                match index {
                    0 => controller.stick_x = norm,
                    1 => controller.stick_y = norm,
                    _ => return,
                }

                // Movement buttons are derived once per resolved axis value,
                // edge-detected against the previous frame like any other
                // joystick button. Up is negative y.
                let old_controller = &old.controllers[MERGED_SLOT];
                let (x, y) = (controller.stick_x, controller.stick_y);
                for (button, held) in [
                    (VirtualButton::MoveUp, y < -DIGITAL_THRESHOLD),
                    (VirtualButton::MoveDown, y > DIGITAL_THRESHOLD),
                    (VirtualButton::MoveLeft, x < -DIGITAL_THRESHOLD),
                    (VirtualButton::MoveRight, x > DIGITAL_THRESHOLD),
                ] {
                    apply_pad_edge(
                        old_controller.button(button),
                        controller.button_mut(button),
                        held,
                    );
                }
            }
        }
    }

    /// The completed snapshot for the current frame.
    pub fn frame(&self) -> &InputFrame {
        &self.frames[self.new_index]
    }

    /// Swap frame roles: the snapshot just read becomes the comparison
    /// baseline for the next frame.
    pub fn end_frame(&mut self) {
        self.new_index ^= 1;
    }

    fn new_old_mut(&mut self) -> (&mut InputFrame, &InputFrame) {
        let (head, tail) = self.frames.split_at_mut(1);
        if self.new_index == 0 {
            (&mut head[0], &tail[0])
        } else {
            (&mut tail[0], &head[0])
        }
    }
}

/// Joystick button indexes follow the Linux joystick layout the loop was
/// originally written against.
fn pad_button(index: u8) -> Option<VirtualButton> {
    match index {
        0 => Some(VirtualButton::ActionDown),
        1 => Some(VirtualButton::ActionUp),
        2 => Some(VirtualButton::ActionRight),
        3 => Some(VirtualButton::ActionLeft),
        6 => Some(VirtualButton::Back),
        7 => Some(VirtualButton::Start),
        _ => None,
    }
}
