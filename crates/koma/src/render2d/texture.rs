//! # Texture: Image Data on the GPU
//!
//! Scripts never hold a GPU texture. [`TextureStore::load`] returns a
//! [`Texture`]: a copyable [`TextureHandle`] plus the image's dimensions. The
//! store owns the backend textures for the life of the process and caches
//! them by path, so loading the same file twice decodes and uploads once.
//!
//! ```text
//! TextureStore
//! ┌───────────────────────────────────────────────┐
//! │ entries: Vec<TextureEntry>                    │
//! │   [0] 1x1 white (fallback)  ◄── always here   │
//! │   [1] "gfx/player.png"                        │
//! │   [2] "gfx/tiles.png"                         │
//! │                                               │
//! │ path_cache: HashMap<PathBuf, TextureHandle>   │
//! │   "gfx/player.png" → Handle(1)                │
//! │   "gfx/tiles.png"  → Handle(2)                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## The 1x1 White Fallback
//!
//! Entry 0 is a single opaque white pixel. Tinted quads drawn with it come
//! out as solid rectangles, and a failed load hands it back instead of an
//! error so a missing asset shows up as a white box rather than a crash.
//! Failures are not cached: fixing the file on disk and loading again works.
//! An image wider or taller than the backend's texture limit counts as a
//! failure.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::render::GraphicsBackend;

/// Handle to a loaded texture in the [`TextureStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    /// The 1x1 white fallback.
    pub const WHITE: Self = Self(0);

    /// Rebuild a handle from the integer scripts pass around. It is checked
    /// against the store when used.
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// A loaded texture as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

struct TextureEntry<T> {
    gpu: T,
    width: u32,
    height: u32,
    /// Channels in the source image (3 for RGB, 4 for RGBA). Uploads are
    /// always RGBA8.
    channels: u8,
}

/// Stores all loaded textures.
pub struct TextureStore<T> {
    entries: Vec<TextureEntry<T>>,
    path_cache: HashMap<PathBuf, TextureHandle>,
}

impl<T> TextureStore<T> {
    /// Create a new store with the 1x1 white texture at index 0.
    pub fn new<B: GraphicsBackend<Texture = T>>(backend: &mut B) -> Self {
        let white = backend.create_texture("white texture", 1, 1, &[255, 255, 255, 255]);
        Self {
            entries: vec![TextureEntry {
                gpu: white,
                width: 1,
                height: 1,
                channels: 4,
            }],
            path_cache: HashMap::new(),
        }
    }

    /// Load an image file, or return the cached texture for `path`.
    ///
    /// A file that is missing or cannot be decoded logs a warning and yields
    /// the white fallback.
    pub fn load<B: GraphicsBackend<Texture = T>>(&mut self, backend: &mut B, path: impl AsRef<Path>) -> Texture {
        let path = path.as_ref();
        if let Some(&handle) = self.path_cache.get(path) {
            return self.describe(handle);
        }

        let img = match image::open(path) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("failed to load texture '{}': {}", path.display(), e);
                return self.white();
            }
        };
        let max = backend.max_texture_dimension();
        if img.width() > max || img.height() > max {
            log::warn!(
                "texture '{}' is {}x{}, larger than the GPU limit of {}",
                path.display(),
                img.width(),
                img.height(),
                max
            );
            return self.white();
        }
        let channels = img.color().channel_count();
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let label = path.to_string_lossy();
        let gpu = backend.create_texture(&label, width, height, rgba.as_raw());
        let handle = self.push(gpu, width, height, channels);
        self.path_cache.insert(path.to_owned(), handle);
        log::debug!("loaded texture '{}' ({}x{}, {} channels)", label, width, height, channels);

        self.describe(handle)
    }

    /// Upload raw RGBA8 pixels as a new, uncached texture.
    #[cfg(test)]
    pub(crate) fn create_from_rgba<B: GraphicsBackend<Texture = T>>(
        &mut self,
        backend: &mut B,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Texture {
        let gpu = backend.create_texture(label, width, height, rgba);
        let handle = self.push(gpu, width, height, 4);
        self.describe(handle)
    }

    /// The 1x1 white fallback texture.
    pub fn white(&self) -> Texture {
        self.describe(TextureHandle::WHITE)
    }

    /// Dimensions of a loaded texture, `None` for a handle this store never
    /// issued.
    pub fn get(&self, handle: TextureHandle) -> Option<Texture> {
        self.entries.get(handle.0 as usize).map(|e| Texture {
            handle,
            width: e.width,
            height: e.height,
        })
    }

    /// Channel count of the source image.
    pub fn channels(&self, handle: TextureHandle) -> Option<u8> {
        self.entries.get(handle.0 as usize).map(|e| e.channels)
    }

    /// The backend texture behind `handle`.
    pub(crate) fn gpu_texture(&self, handle: TextureHandle) -> Option<&T> {
        self.entries.get(handle.0 as usize).map(|e| &e.gpu)
    }

    fn push(&mut self, gpu: T, width: u32, height: u32, channels: u8) -> TextureHandle {
        let handle = TextureHandle(self.entries.len() as u32);
        self.entries.push(TextureEntry {
            gpu,
            width,
            height,
            channels,
        });
        handle
    }

    fn describe(&self, handle: TextureHandle) -> Texture {
        let e = &self.entries[handle.0 as usize];
        Texture {
            handle,
            width: e.width,
            height: e.height,
        }
    }
}
