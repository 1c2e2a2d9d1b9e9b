//! Gamepad polling via [gilrs](https://docs.rs/gilrs).
//!
//! Only one pad is active at a time: the first one connected. Its buttons are
//! mirrored into [`Engine::pad`](crate::engine::Engine::pad), where
//! `input.down` checks them alongside the keyboard. Like [`Audio`](crate::audio::Audio),
//! a missing backend is logged once and polling becomes a no-op.

use std::fmt;

use gilrs::{Event, EventType, GamepadId, Gilrs};

use crate::input::{Button, Input};

/// What the active-pad tracking cares about in a gilrs event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PadEvent {
    Connected,
    Disconnected,
    Pressed(Button),
    Released(Button),
    Ignored,
}

impl From<EventType> for PadEvent {
    fn from(event: EventType) -> Self {
        match event {
            EventType::Connected => PadEvent::Connected,
            EventType::Disconnected => PadEvent::Disconnected,
            EventType::ButtonPressed(button, _) => PadEvent::Pressed(button),
            EventType::ButtonReleased(button, _) => PadEvent::Released(button),
            _ => PadEvent::Ignored,
        }
    }
}

/// Apply one event from pad `id` to the active pad's button state.
fn apply<I: Copy + PartialEq + fmt::Debug>(active: &mut Option<I>, id: I, event: PadEvent, pad: &mut Input<Button>) {
    if event == PadEvent::Disconnected {
        if *active == Some(id) {
            log::info!("gamepad {:?} disconnected", id);
            pad.release_all();
            *active = None;
        }
        return;
    }

    if active.is_none() {
        log::info!("using gamepad {:?}", id);
        *active = Some(id);
    }
    if *active != Some(id) {
        return;
    }

    match event {
        PadEvent::Pressed(button) => pad.press(button),
        PadEvent::Released(button) => pad.release(button),
        _ => {}
    }
}

/// The gilrs context and the id of the pad being listened to.
pub struct Gamepads {
    gilrs: Option<Gilrs>,
    active: Option<GamepadId>,
}

impl Gamepads {
    /// Open the platform gamepad backend, or run without pads.
    pub fn new() -> Self {
        match Gilrs::new() {
            Ok(gilrs) => {
                let active = gilrs.gamepads().next().map(|(id, gamepad)| {
                    log::info!("using gamepad {} ({:?})", gamepad.name(), id);
                    id
                });
                Self {
                    gilrs: Some(gilrs),
                    active,
                }
            }
            Err(e) => {
                log::warn!("gamepads disabled: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            gilrs: None,
            active: None,
        }
    }

    /// Drain pending gamepad events into `pad`.
    pub fn poll(&mut self, pad: &mut Input<Button>) {
        let Some(gilrs) = &mut self.gilrs else {
            return;
        };
        while let Some(Event { id, event, .. }) = gilrs.next_event() {
            apply(&mut self.active, id, PadEvent::from(event), pad);
        }
    }
}

impl Default for Gamepads {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Gamepads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gamepads")
            .field("enabled", &self.gilrs.is_some())
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pad_wins() {
        let mut active = None;
        let mut pad = Input::new();
        apply(&mut active, 1, PadEvent::Connected, &mut pad);
        apply(&mut active, 2, PadEvent::Connected, &mut pad);
        apply(&mut active, 2, PadEvent::Pressed(Button::South), &mut pad);
        assert_eq!(active, Some(1));
        assert!(!pad.pressed(Button::South));

        apply(&mut active, 1, PadEvent::Pressed(Button::South), &mut pad);
        assert!(pad.pressed(Button::South));
        apply(&mut active, 1, PadEvent::Released(Button::South), &mut pad);
        assert!(!pad.pressed(Button::South));
    }

    #[test]
    fn disconnect_releases_held_buttons() {
        let mut active = Some(7);
        let mut pad = Input::new();
        apply(&mut active, 7, PadEvent::Pressed(Button::DPadLeft), &mut pad);
        apply(&mut active, 3, PadEvent::Disconnected, &mut pad);
        assert!(pad.pressed(Button::DPadLeft));

        apply(&mut active, 7, PadEvent::Disconnected, &mut pad);
        assert_eq!(active, None);
        assert!(!pad.pressed(Button::DPadLeft));

        apply(&mut active, 3, PadEvent::Pressed(Button::Start), &mut pad);
        assert_eq!(active, Some(3));
        assert!(pad.pressed(Button::Start));
    }

    #[test]
    fn disabled_poll_is_a_no_op() {
        let mut pads = Gamepads::disabled();
        let mut pad = Input::new();
        pads.poll(&mut pad);
        assert!(!pad.pressed(Button::South));
    }
}
