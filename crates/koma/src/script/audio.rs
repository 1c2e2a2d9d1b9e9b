//! `audio` module.
//!
//! ```lua
//! audio.play_music("sfx/theme.ogg", true)
//! audio.play_sfx("sfx/jump.wav")
//! audio.set_volume(96)   -- 0..128
//! ```

use mlua::Lua;

use super::{borrow_engine, publish};
use crate::engine::SharedEngine;
use crate::render::GraphicsBackend;

pub(super) fn register<B: GraphicsBackend + 'static>(lua: &Lua, engine: &SharedEngine<B>) -> mlua::Result<()> {
    let audio = lua.create_table()?;

    let e = engine.clone();
    audio.set(
        "play_sfx",
        lua.create_function(move |_, path: String| {
            borrow_engine(&e)?.audio.play_sfx(&path);
            Ok(())
        })?,
    )?;

    let e = engine.clone();
    audio.set(
        "play_music",
        lua.create_function(move |_, (path, looping): (String, Option<bool>)| {
            borrow_engine(&e)?.audio.play_music(&path, looping.unwrap_or(false));
            Ok(())
        })?,
    )?;

    let e = engine.clone();
    audio.set(
        "set_volume",
        lua.create_function(move |_, volume: i64| {
            borrow_engine(&e)?.audio.set_volume(volume);
            Ok(())
        })?,
    )?;

    publish(lua, "audio", audio)
}

#[cfg(test)]
mod tests {
    use crate::testing::headless_runtime;

    #[test]
    fn volume_is_clamped_from_lua() {
        let (_runtime, engine) = headless_runtime("audio.set_volume(500)");
        assert_eq!(engine.borrow().audio.volume(), 128);
    }

    #[test]
    fn playback_without_device_is_silent() {
        let (runtime, _) = headless_runtime("");
        runtime
            .exec_source("audio.play_sfx('nope.wav'); audio.play_music('nope.ogg', true)", "audio")
            .unwrap();
    }
}
