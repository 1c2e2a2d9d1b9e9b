//! # Driver: One Frame of the Game Loop
//!
//! [`FrameDriver::tick`] is called once per redraw. Each call:
//!
//! ```text
//! 1. measure time since the last frame, clamp it, add it to the accumulator
//! 2. while a full step is available and the engine is running:
//!        _update(step)             error ─► log, quit, Exit(UpdateFailed)
//!        clear input edges
//! 3. acquire + clear the frame, reset the batch
//! 4. _draw()                       error ─► log, keep going
//! 5. flush remaining quads, present
//! 6. Continue, or Exit(Quit) once the running flag is down
//! ```
//!
//! Key edges (`input.pressed`, `input.released`) are latched until an update
//! step has seen them. A frame that runs no update keeps them for the next
//! one, and a frame that runs several reports each edge to the first only.
//!
//! Updates run at a fixed rate (60 Hz by default) regardless of the display's
//! refresh rate, so game logic is deterministic; rendering runs once per
//! frame. See [`time`](crate::time) for the accumulator.

use std::time::Duration;

use crate::config::EngineConfig;
use crate::error::RenderError;
use crate::render::GraphicsBackend;
use crate::script::ScriptRuntime;
use crate::time::{FixedTimestep, FrameClock};

/// Why the frame loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The window was closed or a script called `util.quit()`.
    Quit,
    /// `_update` raised an error; it has been logged.
    UpdateFailed,
}

impl ShutdownReason {
    /// Process exit code. A logged update failure still ends the loop
    /// normally.
    pub fn exit_code(self) -> u8 {
        match self {
            ShutdownReason::Quit | ShutdownReason::UpdateFailed => 0,
        }
    }
}

/// What the event loop should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit(ShutdownReason),
}

/// Fixed-step update scheduling plus the per-frame render sequence.
#[derive(Debug)]
pub struct FrameDriver {
    clock: FrameClock,
    timestep: FixedTimestep,
    updates: u64,
}

impl FrameDriver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            clock: FrameClock::new(),
            timestep: FixedTimestep::new(config.fixed_step(), config.max_frame_duration()),
            updates: 0,
        }
    }

    /// Reset the clock so the time spent booting is not simulated.
    pub fn start(&mut self) {
        self.clock.reset();
        self.timestep.reset();
    }

    /// Run one frame using the wall time since the previous call.
    pub fn tick<B: GraphicsBackend + 'static>(&mut self, runtime: &ScriptRuntime<B>) -> Result<LoopControl, RenderError> {
        let frame_time = self.clock.tick();
        self.run_frame(runtime, frame_time)
    }

    /// Run one frame as if `frame_time` had elapsed.
    ///
    /// Only fatal GPU errors are returned; script errors are handled here.
    pub fn run_frame<B: GraphicsBackend + 'static>(
        &mut self,
        runtime: &ScriptRuntime<B>,
        frame_time: Duration,
    ) -> Result<LoopControl, RenderError> {
        let engine = runtime.engine();
        let step = self.timestep.step_secs();
        self.timestep.accumulate(frame_time);

        while engine.borrow().is_running() && self.timestep.consume() {
            if let Err(e) = runtime.call_update(step) {
                log::error!("_update failed, stopping: {}", e);
                engine.borrow_mut().quit();
                return Ok(LoopControl::Exit(ShutdownReason::UpdateFailed));
            }
            engine.borrow_mut().end_step();
            self.updates += 1;
        }

        engine.borrow_mut().graphics.start_frame()?;

        if let Err(e) = runtime.call_draw() {
            log::error!("_draw failed: {}", e);
        }

        engine.borrow_mut().graphics.finish_frame()?;

        if engine.borrow().is_running() {
            Ok(LoopControl::Continue)
        } else {
            Ok(LoopControl::Exit(ShutdownReason::Quit))
        }
    }

    /// Total `_update` calls so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Frames measured by [`tick`](Self::tick).
    pub fn frames(&self) -> u64 {
        self.clock.frame_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use crate::testing::headless_runtime;

    const FRAME: Duration = Duration::from_millis(17);

    fn driver() -> FrameDriver {
        FrameDriver::new(&EngineConfig::default())
    }

    #[test]
    fn quit_from_update_runs_one_step() {
        let (runtime, engine) = headless_runtime("n = 0\nfunction _update(dt) n = n + 1; util.quit() end");
        let mut driver = driver();
        let control = driver.run_frame(&runtime, Duration::from_millis(100)).unwrap();

        assert_eq!(control, LoopControl::Exit(ShutdownReason::Quit));
        assert_eq!(ShutdownReason::Quit.exit_code(), 0);
        assert_eq!(runtime.lua().globals().get::<i64>("n").unwrap(), 1);
        assert_eq!(driver.updates(), 1);
        // The frame in progress is still drawn and presented.
        assert_eq!(engine.borrow().graphics.backend().presents, 1);
    }

    #[test]
    fn update_error_stops_the_loop() {
        let (runtime, engine) = headless_runtime("function _update(dt) error('kaput') end");
        let mut driver = driver();
        let control = driver.run_frame(&runtime, FRAME).unwrap();

        assert_eq!(control, LoopControl::Exit(ShutdownReason::UpdateFailed));
        assert_eq!(ShutdownReason::UpdateFailed.exit_code(), 0);
        assert!(!engine.borrow().is_running());
    }

    #[test]
    fn draw_error_keeps_running() {
        let (runtime, engine) = headless_runtime("function _draw() error('missing sprite') end");
        let mut driver = driver();
        for _ in 0..3 {
            assert_eq!(driver.run_frame(&runtime, FRAME).unwrap(), LoopControl::Continue);
        }
        let engine = engine.borrow();
        assert_eq!(engine.graphics.backend().frames_begun, 3);
        assert_eq!(engine.graphics.backend().presents, 3);
    }

    #[test]
    fn short_frames_draw_without_updating() {
        let (runtime, engine) = headless_runtime(
            "updates, draws = 0, 0\nfunction _update(dt) updates = updates + 1 end\nfunction _draw() draws = draws + 1 end",
        );
        let mut driver = driver();
        driver.run_frame(&runtime, Duration::from_millis(10)).unwrap();

        let g = runtime.lua().globals();
        assert_eq!(g.get::<i64>("updates").unwrap(), 0);
        assert_eq!(g.get::<i64>("draws").unwrap(), 1);
        assert_eq!(engine.borrow().graphics.backend().presents, 1);

        driver.run_frame(&runtime, Duration::from_millis(10)).unwrap();
        assert_eq!(g.get::<i64>("updates").unwrap(), 1);
    }

    #[test]
    fn stalls_are_clamped() {
        let (runtime, _) = headless_runtime("");
        let mut driver = driver();
        driver.run_frame(&runtime, Duration::from_secs(3)).unwrap();
        assert_eq!(driver.updates(), 15);
    }

    #[test]
    fn update_receives_fixed_step() {
        let (runtime, _) = headless_runtime("function _update(dt) last_dt = dt end");
        driver().run_frame(&runtime, FRAME).unwrap();
        let dt: f64 = runtime.lua().globals().get("last_dt").unwrap();
        assert!((dt - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn draws_are_flushed_at_end_of_frame() {
        let (runtime, engine) = headless_runtime(
            "function _draw() local w = texture.white(); batch.draw(w, 0, 0, 4, 4, 0, 0, 1, 1) end",
        );
        driver().run_frame(&runtime, FRAME).unwrap();
        let engine = engine.borrow();
        assert_eq!(engine.graphics.backend().draws.len(), 1);
        assert_eq!(engine.graphics.stats().draw_calls, 1);
    }

    const EDGE_COUNTER: &str = "seen = 0\nfunction _update(dt) if input.pressed('z') then seen = seen + 1 end end";

    #[test]
    fn edges_wait_for_an_update() {
        let (runtime, engine) = headless_runtime(EDGE_COUNTER);
        engine.borrow_mut().input.press(KeyCode::KeyZ);
        let mut driver = driver();
        let frame = Duration::from_millis(7);

        driver.run_frame(&runtime, frame).unwrap();
        driver.run_frame(&runtime, frame).unwrap();
        assert_eq!(driver.updates(), 0);
        assert!(engine.borrow().input.just_pressed(KeyCode::KeyZ));

        driver.run_frame(&runtime, frame).unwrap();
        assert_eq!(driver.updates(), 1);
        assert_eq!(runtime.lua().globals().get::<i64>("seen").unwrap(), 1);
        assert!(!engine.borrow().input.just_pressed(KeyCode::KeyZ));
        assert!(engine.borrow().input.pressed(KeyCode::KeyZ));
    }

    #[test]
    fn edges_reach_only_the_first_of_several_steps() {
        let (runtime, engine) = headless_runtime(EDGE_COUNTER);
        engine.borrow_mut().input.press(KeyCode::KeyZ);
        let mut driver = driver();
        driver.run_frame(&runtime, Duration::from_millis(50)).unwrap();

        assert_eq!(driver.updates(), 3);
        assert_eq!(runtime.lua().globals().get::<i64>("seen").unwrap(), 1);
    }

    #[test]
    fn draw_sees_edges_not_yet_consumed() {
        let (runtime, engine) = headless_runtime(
            "seen = 0\nfunction _draw() if input.pressed('z') then seen = seen + 1 end end",
        );
        engine.borrow_mut().input.press(KeyCode::KeyZ);
        driver().run_frame(&runtime, Duration::from_millis(5)).unwrap();
        assert_eq!(runtime.lua().globals().get::<i64>("seen").unwrap(), 1);
    }
}
