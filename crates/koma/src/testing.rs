//! Test doubles: a backend that records instead of drawing, and helpers that
//! build a full engine and Lua runtime on top of it.

use std::path::PathBuf;

use crate::audio::Audio;
use crate::config::EngineConfig;
use crate::engine::{Engine, SharedEngine};
use crate::error::RenderError;
use crate::math::Mat4;
use crate::render::{ClearColor, GraphicsBackend};
use crate::render2d::{Graphics, SpriteVertex};
use crate::script::ScriptRuntime;

#[derive(Debug, Clone)]
pub struct TextureUpload {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DrawCall {
    /// Index into `RecordingBackend::textures`.
    pub texture: usize,
    pub vertices: Vec<SpriteVertex>,
}

/// Records every backend call.
#[derive(Debug)]
pub struct RecordingBackend {
    pub textures: Vec<TextureUpload>,
    pub draws: Vec<DrawCall>,
    pub projections: Vec<Mat4>,
    pub clear_colors: Vec<ClearColor>,
    pub frames_begun: u32,
    pub presents: u32,
    pub title: Option<String>,
    pub max_texture_dimension: u32,
    /// Act like a skipped frame: accept draws without drawing.
    pub drop_draws: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            textures: Vec::new(),
            draws: Vec::new(),
            projections: Vec::new(),
            clear_colors: Vec::new(),
            frames_begun: 0,
            presents: 0,
            title: None,
            max_texture_dimension: 8192,
            drop_draws: false,
        }
    }
}

impl GraphicsBackend for RecordingBackend {
    type Texture = usize;

    fn create_texture(&mut self, label: &str, width: u32, height: u32, rgba: &[u8]) -> usize {
        self.textures.push(TextureUpload {
            label: label.to_owned(),
            width,
            height,
            rgba: rgba.to_vec(),
        });
        self.textures.len() - 1
    }

    fn write_projection(&mut self, view_proj: Mat4) {
        self.projections.push(view_proj);
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    fn draw_quads(&mut self, texture: &usize, vertices: &[SpriteVertex]) -> Result<bool, RenderError> {
        if self.drop_draws {
            return Ok(false);
        }
        self.draws.push(DrawCall {
            texture: *texture,
            vertices: vertices.to_vec(),
        });
        Ok(true)
    }

    fn begin_frame(&mut self, clear: ClearColor) -> Result<(), RenderError> {
        self.frames_begun += 1;
        self.clear_colors.push(clear);
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.presents += 1;
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_owned());
    }
}

/// An engine with a recording backend and no audio device.
pub fn headless_engine() -> Engine<RecordingBackend> {
    let config = EngineConfig::default();
    let graphics = Graphics::new(RecordingBackend::default(), &config);
    Engine::new(graphics, Audio::disabled())
}

/// A Lua runtime over [`headless_engine`] with `source` already executed.
pub fn headless_runtime(source: &str) -> (ScriptRuntime<RecordingBackend>, SharedEngine<RecordingBackend>) {
    let engine = headless_engine().into_shared();
    let runtime = ScriptRuntime::new(engine.clone()).unwrap();
    runtime.exec_source(source, "test").unwrap();
    (runtime, engine)
}

/// A per-process scratch path under the system temp dir.
pub fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("koma-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}
