//! Error types.
//!
//! Setup failures ([`EngineError`]) end the process with exit code 1. Per-frame
//! failures are split: [`RenderError::OutOfMemory`] is fatal, everything a
//! script does wrong arrives as an [`mlua::Error`] and is handled by the frame
//! driver according to which callback raised it.

use std::path::PathBuf;

/// Errors raised by the GPU backend, the texture store or the sprite batch.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// No adapter is compatible with the window surface.
    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),

    /// The adapter refused to create a device.
    #[error("failed to create GPU device: {0}")]
    Device(String),

    /// The window surface could not be created.
    #[error("failed to create window surface: {0}")]
    Surface(String),

    /// The sprite shader or its pipeline failed validation.
    #[error("sprite shader failed to compile: {0}")]
    Shader(String),

    /// `max_sprites` quads do not fit in one GPU vertex buffer.
    #[error("max_sprites {max_sprites} needs more vertex buffer than the GPU allows ({limit} bytes)")]
    BatchTooLarge { max_sprites: usize, limit: u64 },

    /// The GPU ran out of memory while acquiring or presenting a frame.
    #[error("out of GPU memory")]
    OutOfMemory,

    /// A draw referenced a handle the texture store never issued.
    #[error("unknown texture handle {0}")]
    UnknownTexture(u32),

    /// A draw was submitted after the batch was shut down.
    #[error("sprite batch has been shut down")]
    ShutDown,
}

/// Errors raised while loading or running Lua code.
#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    /// The boot script could not be read from disk.
    #[error("failed to read script '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Lua reported a syntax or runtime error.
    #[error("lua error: {0}")]
    Lua(#[from] mlua::Error),
}

/// Errors raised while loading `koma.json`.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config '{}': {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Fatal errors that stop the engine before or while it runs.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
