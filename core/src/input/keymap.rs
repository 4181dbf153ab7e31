//! Keyboard to virtual controller mapping

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

use super::VirtualButton;

/// Keyboard to virtual controller mapping with string-based serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardMapping {
    #[serde(
        default = "default_move_up",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub move_up: KeyCode,
    #[serde(
        default = "default_move_down",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub move_down: KeyCode,
    #[serde(
        default = "default_move_left",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub move_left: KeyCode,
    #[serde(
        default = "default_move_right",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub move_right: KeyCode,

    #[serde(
        default = "default_action_up",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub action_up: KeyCode,
    #[serde(
        default = "default_action_down",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub action_down: KeyCode,
    #[serde(
        default = "default_action_left",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub action_left: KeyCode,
    #[serde(
        default = "default_action_right",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub action_right: KeyCode,

    #[serde(
        default = "default_start",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub start: KeyCode,
    #[serde(
        default = "default_back",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub back: KeyCode,
}

// Default functions for serde (enables partial configs)
fn default_move_up() -> KeyCode {
    KeyCode::KeyW
}
fn default_move_down() -> KeyCode {
    KeyCode::KeyS
}
fn default_move_left() -> KeyCode {
    KeyCode::KeyA
}
fn default_move_right() -> KeyCode {
    KeyCode::KeyD
}
fn default_action_up() -> KeyCode {
    KeyCode::ArrowUp
}
fn default_action_down() -> KeyCode {
    KeyCode::ArrowDown
}
fn default_action_left() -> KeyCode {
    KeyCode::ArrowLeft
}
fn default_action_right() -> KeyCode {
    KeyCode::ArrowRight
}
fn default_start() -> KeyCode {
    KeyCode::Enter
}
fn default_back() -> KeyCode {
    KeyCode::ShiftLeft
}

impl Default for KeyboardMapping {
    fn default() -> Self {
        Self {
            // WASD for movement
            move_up: KeyCode::KeyW,
            move_down: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,

            // Arrow keys for action buttons
            action_up: KeyCode::ArrowUp,
            action_down: KeyCode::ArrowDown,
            action_left: KeyCode::ArrowLeft,
            action_right: KeyCode::ArrowRight,

            // Enter/Shift for Start/Back
            start: KeyCode::Enter,
            back: KeyCode::ShiftLeft,
        }
    }
}

impl KeyboardMapping {
    /// Build the lookup table the event handler uses to translate key codes.
    ///
    /// Later bindings win if the same key is bound twice.
    pub fn resolve(&self) -> HashMap<KeyCode, VirtualButton> {
        let mut table = HashMap::with_capacity(VirtualButton::COUNT);
        for (key, button) in [
            (self.move_up, VirtualButton::MoveUp),
            (self.move_down, VirtualButton::MoveDown),
            (self.move_left, VirtualButton::MoveLeft),
            (self.move_right, VirtualButton::MoveRight),
            (self.action_up, VirtualButton::ActionUp),
            (self.action_down, VirtualButton::ActionDown),
            (self.action_left, VirtualButton::ActionLeft),
            (self.action_right, VirtualButton::ActionRight),
            (self.start, VirtualButton::Start),
            (self.back, VirtualButton::Back),
        ] {
            table.insert(key, button);
        }
        table
    }
}

/// Convert KeyCode to a human-readable string name
pub(crate) fn keycode_to_string(key: &KeyCode) -> &'static str {
    match key {
        // Letters
        KeyCode::KeyA => "A",
        KeyCode::KeyB => "B",
        KeyCode::KeyC => "C",
        KeyCode::KeyD => "D",
        KeyCode::KeyE => "E",
        KeyCode::KeyF => "F",
        KeyCode::KeyG => "G",
        KeyCode::KeyH => "H",
        KeyCode::KeyI => "I",
        KeyCode::KeyJ => "J",
        KeyCode::KeyK => "K",
        KeyCode::KeyL => "L",
        KeyCode::KeyM => "M",
        KeyCode::KeyN => "N",
        KeyCode::KeyO => "O",
        KeyCode::KeyP => "P",
        KeyCode::KeyQ => "Q",
        KeyCode::KeyR => "R",
        KeyCode::KeyS => "S",
        KeyCode::KeyT => "T",
        KeyCode::KeyU => "U",
        KeyCode::KeyV => "V",
        KeyCode::KeyW => "W",
        KeyCode::KeyX => "X",
        KeyCode::KeyY => "Y",
        KeyCode::KeyZ => "Z",

        // Numbers
        KeyCode::Digit0 => "0",
        KeyCode::Digit1 => "1",
        KeyCode::Digit2 => "2",
        KeyCode::Digit3 => "3",
        KeyCode::Digit4 => "4",
        KeyCode::Digit5 => "5",
        KeyCode::Digit6 => "6",
        KeyCode::Digit7 => "7",
        KeyCode::Digit8 => "8",
        KeyCode::Digit9 => "9",

        // Arrow keys
        KeyCode::ArrowUp => "ArrowUp",
        KeyCode::ArrowDown => "ArrowDown",
        KeyCode::ArrowLeft => "ArrowLeft",
        KeyCode::ArrowRight => "ArrowRight",

        // Modifiers
        KeyCode::ShiftLeft => "ShiftLeft",
        KeyCode::ShiftRight => "ShiftRight",
        KeyCode::ControlLeft => "ControlLeft",
        KeyCode::ControlRight => "ControlRight",
        KeyCode::AltLeft => "AltLeft",
        KeyCode::AltRight => "AltRight",

        // Special keys
        KeyCode::Space => "Space",
        KeyCode::Enter => "Enter",
        KeyCode::Escape => "Escape",
        KeyCode::Backspace => "Backspace",
        KeyCode::Tab => "Tab",

        // Default for unsupported keys
        _ => "Unknown",
    }
}

/// Convert a string name back to KeyCode
pub(crate) fn string_to_keycode(s: &str) -> Option<KeyCode> {
    match s {
        // Letters
        "A" => Some(KeyCode::KeyA),
        "B" => Some(KeyCode::KeyB),
        "C" => Some(KeyCode::KeyC),
        "D" => Some(KeyCode::KeyD),
        "E" => Some(KeyCode::KeyE),
        "F" => Some(KeyCode::KeyF),
        "G" => Some(KeyCode::KeyG),
        "H" => Some(KeyCode::KeyH),
        "I" => Some(KeyCode::KeyI),
        "J" => Some(KeyCode::KeyJ),
        "K" => Some(KeyCode::KeyK),
        "L" => Some(KeyCode::KeyL),
        "M" => Some(KeyCode::KeyM),
        "N" => Some(KeyCode::KeyN),
        "O" => Some(KeyCode::KeyO),
        "P" => Some(KeyCode::KeyP),
        "Q" => Some(KeyCode::KeyQ),
        "R" => Some(KeyCode::KeyR),
        "S" => Some(KeyCode::KeyS),
        "T" => Some(KeyCode::KeyT),
        "U" => Some(KeyCode::KeyU),
        "V" => Some(KeyCode::KeyV),
        "W" => Some(KeyCode::KeyW),
        "X" => Some(KeyCode::KeyX),
        "Y" => Some(KeyCode::KeyY),
        "Z" => Some(KeyCode::KeyZ),

        // Numbers
        "0" => Some(KeyCode::Digit0),
        "1" => Some(KeyCode::Digit1),
        "2" => Some(KeyCode::Digit2),
        "3" => Some(KeyCode::Digit3),
        "4" => Some(KeyCode::Digit4),
        "5" => Some(KeyCode::Digit5),
        "6" => Some(KeyCode::Digit6),
        "7" => Some(KeyCode::Digit7),
        "8" => Some(KeyCode::Digit8),
        "9" => Some(KeyCode::Digit9),

        // Arrow keys
        "ArrowUp" => Some(KeyCode::ArrowUp),
        "ArrowDown" => Some(KeyCode::ArrowDown),
        "ArrowLeft" => Some(KeyCode::ArrowLeft),
        "ArrowRight" => Some(KeyCode::ArrowRight),

        // Modifiers
        "ShiftLeft" => Some(KeyCode::ShiftLeft),
        "ShiftRight" => Some(KeyCode::ShiftRight),
        "ControlLeft" => Some(KeyCode::ControlLeft),
        "ControlRight" => Some(KeyCode::ControlRight),
        "AltLeft" => Some(KeyCode::AltLeft),
        "AltRight" => Some(KeyCode::AltRight),

        // Special keys
        "Space" => Some(KeyCode::Space),
        "Enter" => Some(KeyCode::Enter),
        "Escape" => Some(KeyCode::Escape),
        "Backspace" => Some(KeyCode::Backspace),
        "Tab" => Some(KeyCode::Tab),

        _ => None,
    }
}

/// Serialize a KeyCode as a string
fn serialize_keycode<S>(key: &KeyCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(keycode_to_string(key))
}

/// Deserialize a KeyCode from a string
fn deserialize_keycode<'de, D>(deserializer: D) -> Result<KeyCode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    string_to_keycode(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("Unknown key name: '{}'", s)))
}
