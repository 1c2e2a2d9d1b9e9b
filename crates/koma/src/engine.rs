//! The engine context shared between the frame driver and Lua.
//!
//! [`Engine`] owns everything a script can reach: the sprite renderer, audio,
//! keyboard state and the running flag. It is shared with native Lua
//! functions as a [`SharedEngine`] (`Rc<RefCell<_>>`); everything runs on the
//! event-loop thread, and no borrow is held while Lua code runs.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::audio::Audio;
use crate::input::{Button, Input, KeyCode};
use crate::render::GraphicsBackend;
use crate::render2d::Graphics;

/// Engine state reachable from scripts.
pub struct Engine<B: GraphicsBackend> {
    pub graphics: Graphics<B>,
    pub audio: Audio,
    pub input: Input<KeyCode>,
    /// Buttons of the active gamepad, fed by [`Gamepads`](crate::gamepad::Gamepads).
    pub pad: Input<Button>,
    started: Instant,
    running: bool,
}

/// The engine as shared with Lua bindings.
pub type SharedEngine<B> = Rc<RefCell<Engine<B>>>;

impl<B: GraphicsBackend> Engine<B> {
    pub fn new(graphics: Graphics<B>, audio: Audio) -> Self {
        Self {
            graphics,
            audio,
            input: Input::new(),
            pad: Input::new(),
            started: Instant::now(),
            running: true,
        }
    }

    pub fn into_shared(self) -> SharedEngine<B> {
        Rc::new(RefCell::new(self))
    }

    /// Ask the frame loop to stop after the current step.
    pub fn quit(&mut self) {
        if self.running {
            log::info!("quit requested");
        }
        self.running = false;
    }

    /// Forget key and button edges once an update step has seen them.
    pub fn end_step(&mut self) {
        self.input.clear_just();
        self.pad.clear_just();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time since the engine was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whole milliseconds since the engine was created.
    pub fn ticks_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Seconds since the engine was created.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use crate::input::{Button, KeyCode};
    use crate::testing::headless_engine;

    #[test]
    fn quit_clears_running() {
        let mut engine = headless_engine();
        assert!(engine.is_running());
        engine.quit();
        engine.quit();
        assert!(!engine.is_running());
    }

    #[test]
    fn end_step_clears_edges_only() {
        let mut engine = headless_engine();
        engine.input.press(KeyCode::Space);
        engine.pad.press(Button::South);
        engine.end_step();
        assert!(!engine.input.just_pressed(KeyCode::Space));
        assert!(!engine.pad.just_pressed(Button::South));
        assert!(engine.input.pressed(KeyCode::Space));
        assert!(engine.pad.pressed(Button::South));
    }

    #[test]
    fn clock_is_monotonic() {
        let engine = headless_engine();
        let a = engine.elapsed_secs();
        let b = engine.elapsed_secs();
        assert!(b >= a);
        assert!(engine.ticks_ms() < 60_000);
    }
}
