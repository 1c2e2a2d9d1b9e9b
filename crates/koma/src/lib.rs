//! # Koma: Lua-Driven 2D Sprite Engine
//!
//! A small engine shell for pixel-art games: it opens a window, sets up wgpu,
//! audio and keyboard input, then hands control to a Lua boot script that
//! implements `_init`, `_update(dt)` and `_draw()`.
//!
//! The interesting part is the batched sprite renderer in [`render2d`]; the
//! rest is plumbing around it. Start with [`App`](app::App) to run a game, or
//! with [`Engine`](engine::Engine) and [`ScriptRuntime`](script::ScriptRuntime)
//! to drive frames by hand.

pub mod app;
pub mod audio;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod gamepad;
pub mod input;
pub mod logging;
pub mod math;
pub mod render;
pub mod render2d;
pub mod script;
pub mod time;

#[cfg(test)]
pub(crate) mod testing;

pub use app::App;
pub use config::EngineConfig;
pub use driver::{FrameDriver, LoopControl, ShutdownReason};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, RenderError, ScriptError};
pub use script::ScriptRuntime;
