//! Audio playback via [kira](https://docs.rs/kira).
//!
//! [`Audio`] keeps a cache of decoded sound effects and at most one music
//! track. It never fails: when no output device can be opened it logs a
//! warning once and every call becomes a no-op, and a sound file that cannot
//! be decoded is reported and skipped.
//!
//! Volume uses a 0–128 integer scale and applies to every sound through
//! kira's main track.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, Decibels, DefaultBackend, Tween};

/// Loudest value accepted by [`Audio::set_volume`].
pub const MAX_VOLUME: u8 = 128;

/// Convert a linear amplitude (0.0 = silence, 1.0 = full) to decibels.
fn amplitude_to_db(amplitude: f64) -> Decibels {
    if amplitude <= 0.0 {
        Decibels::SILENCE
    } else {
        Decibels((20.0 * amplitude.log10()) as f32)
    }
}

/// Sound effects, one music track, and a global volume.
pub struct Audio {
    manager: Option<AudioManager<DefaultBackend>>,
    sfx_cache: HashMap<PathBuf, StaticSoundData>,
    music: Option<StaticSoundHandle>,
    volume: u8,
}

impl Audio {
    /// Open the default output device, or fall back to silence.
    pub fn new() -> Self {
        match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(manager) => Self::with_manager(Some(manager)),
            Err(e) => {
                log::warn!("audio disabled: {}", e);
                Self::disabled()
            }
        }
    }

    /// An instance that plays nothing.
    pub fn disabled() -> Self {
        Self::with_manager(None)
    }

    fn with_manager(manager: Option<AudioManager<DefaultBackend>>) -> Self {
        Self {
            manager,
            sfx_cache: HashMap::new(),
            music: None,
            volume: MAX_VOLUME,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.manager.is_some()
    }

    /// Play a sound effect once. The decoded data is cached by path; a file
    /// that fails to load is not cached.
    pub fn play_sfx(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let Some(manager) = self.manager.as_mut() else {
            return;
        };

        let data = match self.sfx_cache.get(path) {
            Some(data) => data.clone(),
            None => match StaticSoundData::from_file(path) {
                Ok(data) => {
                    self.sfx_cache.insert(path.to_owned(), data.clone());
                    data
                }
                Err(e) => {
                    log::warn!("failed to load sfx '{}': {}", path.display(), e);
                    return;
                }
            },
        };

        if let Err(e) = manager.play(data) {
            log::warn!("failed to play sfx '{}': {}", path.display(), e);
        }
    }

    /// Replace the current music track. The old track stops even if the new
    /// one fails to load.
    pub fn play_music(&mut self, path: impl AsRef<Path>, looping: bool) {
        let path = path.as_ref();
        self.stop_music();
        let Some(manager) = self.manager.as_mut() else {
            return;
        };

        let mut data = match StaticSoundData::from_file(path) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("failed to load music '{}': {}", path.display(), e);
                return;
            }
        };
        if looping {
            data = data.loop_region(..);
        }

        match manager.play(data) {
            Ok(handle) => self.music = Some(handle),
            Err(e) => log::warn!("failed to play music '{}': {}", path.display(), e),
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(mut music) = self.music.take() {
            music.stop(Tween::default());
        }
    }

    /// Set the global volume, clamped to `0..=128`. Returns the applied value.
    pub fn set_volume(&mut self, volume: i64) -> u8 {
        let volume = volume.clamp(0, i64::from(MAX_VOLUME)) as u8;
        self.volume = volume;
        if let Some(manager) = self.manager.as_mut() {
            let amplitude = f64::from(volume) / f64::from(MAX_VOLUME);
            manager
                .main_track()
                .set_volume(amplitude_to_db(amplitude), Tween::default());
        }
        volume
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }
}

impl Default for Audio {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Audio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Audio")
            .field("enabled", &self.is_enabled())
            .field("cached_sfx", &self.sfx_cache.len())
            .field("music", &self.music.is_some())
            .field("volume", &self.volume)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_clamped() {
        let mut audio = Audio::disabled();
        assert_eq!(audio.set_volume(-5), 0);
        assert_eq!(audio.set_volume(300), 128);
        assert_eq!(audio.set_volume(64), 64);
        assert_eq!(audio.volume(), 64);
    }

    #[test]
    fn amplitude_maps_to_decibels() {
        assert_eq!(amplitude_to_db(0.0), Decibels::SILENCE);
        assert_eq!(amplitude_to_db(1.0), Decibels(0.0));
        assert!((amplitude_to_db(0.5).0 + 6.0206).abs() < 1e-3);
    }

    #[test]
    fn disabled_audio_ignores_playback() {
        let mut audio = Audio::disabled();
        audio.play_sfx("missing.wav");
        audio.play_music("missing.ogg", true);
        audio.stop_music();
        assert!(!audio.is_enabled());
        assert!(audio.sfx_cache.is_empty());
    }
}
