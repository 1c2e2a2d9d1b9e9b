//! Frame timing and the fixed update step.
//!
//! [`FrameClock`] measures wall time between frames. [`FixedTimestep`] turns
//! those measurements into a whole number of constant-length update steps,
//! carrying the remainder over to the next frame.
//!
//! ## Spiral of Death
//!
//! If a frame takes longer than the work it schedules, the next frame has even
//! more steps to run, and the game never catches up. Each frame's elapsed time
//! is clamped to `max_frame_time` (0.25 s by default) before it enters the
//! accumulator, so a stall costs at most 15 updates at 60 Hz and the
//! simulation slows down instead of freezing.
//!
//! The accumulator is kept as a [`Duration`] (integer nanoseconds) so step
//! counts are exact and reproducible.

use std::time::{Duration, Instant};

/// Wall-clock sampler for the frame loop.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    /// When the previous frame was sampled.
    last: Instant,
    /// Frames sampled so far.
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last: now,
            frame_count: 0,
        }
    }

    /// Restart the measurement baseline (called right before the loop starts,
    /// so boot time does not count as a frame).
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Time since the previous call.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.saturating_duration_since(self.last);
        self.last = now;
        self.frame_count += 1;
        delta
    }

    /// Number of frames sampled so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-step accumulator.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimestep {
    step: Duration,
    max_frame_time: Duration,
    accumulator: Duration,
}

impl FixedTimestep {
    pub fn new(step: Duration, max_frame_time: Duration) -> Self {
        debug_assert!(!step.is_zero());
        Self {
            step,
            max_frame_time,
            accumulator: Duration::ZERO,
        }
    }

    /// Add one frame's elapsed time, clamped to `max_frame_time`.
    pub fn accumulate(&mut self, frame_time: Duration) {
        self.accumulator += frame_time.min(self.max_frame_time);
    }

    /// Take one step out of the accumulator. Returns `false` once less than a
    /// full step remains.
    pub fn consume(&mut self) -> bool {
        if self.accumulator >= self.step {
            self.accumulator -= self.step;
            true
        } else {
            false
        }
    }

    /// Drop any accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }

    /// Step length in seconds, as passed to `_update(dt)`.
    pub fn step_secs(&self) -> f64 {
        self.step.as_secs_f64()
    }

    /// Time left over after the last consumed step.
    pub fn remainder(&self) -> Duration {
        self.accumulator
    }
}
