//! Keyboard and gamepad input state.
//!
//! The [`Input`] resource tracks which keys are currently held, just pressed,
//! or just released since the last update step. The window event handler feeds
//! it; scripts query it by name through [`key_from_name`]. A few keys also
//! answer to a gamepad button ([`button_for_key`]) so keyboard-only games are
//! playable with a pad.

use std::collections::HashSet;
use std::hash::Hash;

pub use gilrs::Button;
pub use winit::keyboard::KeyCode;

/// Tracks the state of a set of inputs.
///
/// - `pressed`: currently held down
/// - `just_pressed`: pressed since the last [`clear_just`](Self::clear_just)
/// - `just_released`: released since the last `clear_just`
#[derive(Debug)]
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    /// Returns `true` if the input is currently held down.
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    /// Returns `true` if the input went down since the last `clear_just`.
    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    /// Returns `true` if the input went up since the last `clear_just`.
    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    /// Call when an input is pressed (from the event handler). Key repeat
    /// events do not re-trigger `just_pressed`.
    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    /// Call when an input is released (from the event handler).
    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    /// Release everything held, e.g. when a gamepad disconnects.
    pub fn release_all(&mut self) {
        let held: Vec<T> = self.pressed.iter().copied().collect();
        for input in held {
            self.release(input);
        }
    }

    /// Clear edge state. Called after each update step.
    pub fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The gamepad button that also counts as holding `key`.
///
/// Z, X and C are the south, west and east face buttons, the arrows are the
/// D-pad and Return is Start.
pub fn button_for_key(key: KeyCode) -> Option<Button> {
    Some(match key {
        KeyCode::KeyZ => Button::South,
        KeyCode::KeyX => Button::West,
        KeyCode::KeyC => Button::East,
        KeyCode::ArrowUp => Button::DPadUp,
        KeyCode::ArrowDown => Button::DPadDown,
        KeyCode::ArrowLeft => Button::DPadLeft,
        KeyCode::ArrowRight => Button::DPadRight,
        KeyCode::Enter => Button::Start,
        _ => return None,
    })
}

/// Map a script-facing key name to a physical key code.
///
/// Names are case-insensitive: single letters and digits, arrow names, and a
/// handful of control keys. Returns `None` for anything else.
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    let lower = name.to_ascii_lowercase();
    let key = match lower.as_str() {
        "up" => KeyCode::ArrowUp,
        "down" => KeyCode::ArrowDown,
        "left" => KeyCode::ArrowLeft,
        "right" => KeyCode::ArrowRight,
        "space" => KeyCode::Space,
        "return" | "enter" => KeyCode::Enter,
        "escape" | "esc" => KeyCode::Escape,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "shift" | "lshift" => KeyCode::ShiftLeft,
        "rshift" => KeyCode::ShiftRight,
        "ctrl" | "lctrl" => KeyCode::ControlLeft,
        "rctrl" => KeyCode::ControlRight,
        "alt" | "lalt" => KeyCode::AltLeft,
        "ralt" => KeyCode::AltRight,
        other => return single_char_key(other).or_else(|| function_key(other)),
    };
    Some(key)
}

fn single_char_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
        KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
        KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
        KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
        KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
        KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
    ];
    match c {
        'a'..='z' => Some(LETTERS[(c as u8 - b'a') as usize]),
        '0'..='9' => Some(DIGITS[(c as u8 - b'0') as usize]),
        _ => None,
    }
}

fn function_key(name: &str) -> Option<KeyCode> {
    const KEYS: [KeyCode; 12] = [
        KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
        KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
    ];
    let n: usize = name.strip_prefix('f')?.parse().ok()?;
    KEYS.get(n.checked_sub(1)?).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_sets_edge_once() {
        let mut input = Input::new();
        input.press(KeyCode::KeyZ);
        input.press(KeyCode::KeyZ);
        assert!(input.pressed(KeyCode::KeyZ));
        assert!(input.just_pressed(KeyCode::KeyZ));

        input.clear_just();
        assert!(input.pressed(KeyCode::KeyZ));
        assert!(!input.just_pressed(KeyCode::KeyZ));

        input.release(KeyCode::KeyZ);
        assert!(!input.pressed(KeyCode::KeyZ));
        assert!(input.just_released(KeyCode::KeyZ));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut input = Input::new();
        input.release(KeyCode::Space);
        assert!(!input.just_released(KeyCode::Space));
    }

    #[test]
    fn release_all_reports_edges() {
        let mut input = Input::new();
        input.press(Button::South);
        input.press(Button::DPadLeft);
        input.clear_just();
        input.release_all();
        assert!(!input.pressed(Button::South));
        assert!(input.just_released(Button::South));
        assert!(input.just_released(Button::DPadLeft));
    }

    #[test]
    fn pad_mapping() {
        assert_eq!(button_for_key(KeyCode::KeyZ), Some(Button::South));
        assert_eq!(button_for_key(KeyCode::KeyX), Some(Button::West));
        assert_eq!(button_for_key(KeyCode::KeyC), Some(Button::East));
        assert_eq!(button_for_key(KeyCode::ArrowUp), Some(Button::DPadUp));
        assert_eq!(button_for_key(KeyCode::Enter), Some(Button::Start));
        assert_eq!(button_for_key(KeyCode::Space), None);
    }

    #[test]
    fn key_names() {
        assert_eq!(key_from_name("z"), Some(KeyCode::KeyZ));
        assert_eq!(key_from_name("X"), Some(KeyCode::KeyX));
        assert_eq!(key_from_name("7"), Some(KeyCode::Digit7));
        assert_eq!(key_from_name("Up"), Some(KeyCode::ArrowUp));
        assert_eq!(key_from_name("return"), Some(KeyCode::Enter));
        assert_eq!(key_from_name("enter"), Some(KeyCode::Enter));
        assert_eq!(key_from_name("f12"), Some(KeyCode::F12));
        assert_eq!(key_from_name("f0"), None);
        assert_eq!(key_from_name("f13"), None);
        assert_eq!(key_from_name("jump"), None);
        assert_eq!(key_from_name(""), None);
    }
}
