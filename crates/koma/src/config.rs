//! Engine configuration.
//!
//! [`EngineConfig`] is read from `koma.json` in the working directory when the
//! file exists. Every field is optional; missing fields take the defaults
//! below, which match a SNES-sized 256x224 canvas scaled 3x.
//!
//! ```json
//! {
//!     "title": "My Game",
//!     "window_scale": 4,
//!     "clear_color": [0.0, 0.0, 0.0, 1.0]
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::render::ClearColor;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "koma.json";

/// Startup configuration for the window, renderer and frame driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window title.
    pub title: String,
    /// Width of the logical pixel grid games are authored against.
    pub internal_width: u32,
    /// Height of the logical pixel grid.
    pub internal_height: u32,
    /// Initial window size as a multiple of the internal resolution.
    pub window_scale: u32,
    /// Quads per batch before a flush is forced.
    pub max_sprites: usize,
    /// Fixed update rate in Hz.
    pub update_rate: u32,
    /// Upper bound on the elapsed time fed into one frame, in seconds.
    pub max_frame_time: f64,
    /// Background color the frame is cleared to.
    pub clear_color: [f64; 4],
    /// Wait for vertical blank when presenting.
    pub vsync: bool,
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("koma"),
            internal_width: 256,
            internal_height: 224,
            window_scale: 3,
            max_sprites: 1000,
            update_rate: 60,
            max_frame_time: 0.25,
            clear_color: ClearColor::default().0,
            vsync: true,
            log_filter: None,
        }
    }
}

impl EngineConfig {
    /// Load the config from `dir/koma.json`, or return the defaults if the
    /// file does not exist.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load the config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate().map_err(|reason| ConfigError::Invalid {
            path: path.to_owned(),
            reason,
        })?;
        Ok(config)
    }

    /// Reject values the window and frame driver cannot represent.
    pub fn validate(&self) -> Result<(), String> {
        if !self.max_frame_time.is_finite() || Duration::try_from_secs_f64(self.max_frame_time.max(0.0)).is_err() {
            return Err(format!("max_frame_time {} is not a usable number of seconds", self.max_frame_time));
        }
        let scale = self.window_scale.max(1);
        if self.internal_width.checked_mul(scale).is_none() || self.internal_height.checked_mul(scale).is_none() {
            return Err(format!(
                "window size {}x{} at scale {} overflows",
                self.internal_width, self.internal_height, scale
            ));
        }
        Ok(())
    }

    /// Length of one fixed update step.
    pub fn fixed_step(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.update_rate.max(1)))
    }

    /// Elapsed-time clamp for one frame.
    pub fn max_frame_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_frame_time.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn clear_color(&self) -> ClearColor {
        ClearColor(self.clear_color)
    }

    /// Initial window size in physical pixels.
    pub fn window_size(&self) -> (u32, u32) {
        let scale = self.window_scale.max(1);
        (
            self.internal_width.saturating_mul(scale),
            self.internal_height.saturating_mul(scale),
        )
    }
}
