//! `util` module: clock, platform and process helpers.

use std::path::Path;

use mlua::Lua;

use super::{borrow_engine, publish};
use crate::engine::SharedEngine;
use crate::render::GraphicsBackend;

pub(super) fn register<B: GraphicsBackend + 'static>(lua: &Lua, engine: &SharedEngine<B>) -> mlua::Result<()> {
    let util = lua.create_table()?;

    let e = engine.clone();
    util.set(
        "ticks",
        lua.create_function(move |_, ()| Ok(borrow_engine(&e)?.ticks_ms()))?,
    )?;

    let e = engine.clone();
    util.set(
        "time",
        lua.create_function(move |_, ()| Ok(borrow_engine(&e)?.elapsed_secs()))?,
    )?;

    util.set("os", lua.create_function(|_, ()| Ok(std::env::consts::OS))?)?;

    util.set(
        "file_exists",
        lua.create_function(|_, path: String| Ok(Path::new(&path).is_file()))?,
    )?;

    let e = engine.clone();
    util.set(
        "quit",
        lua.create_function(move |_, ()| {
            borrow_engine(&e)?.quit();
            Ok(())
        })?,
    )?;

    publish(lua, "util", util)
}

#[cfg(test)]
mod tests {
    use crate::testing::{headless_runtime, temp_path};

    #[test]
    fn clock_and_platform() {
        let (runtime, _) = headless_runtime("t, s, os_name = util.ticks(), util.time(), util.os()");
        let g = runtime.lua().globals();
        assert!(g.get::<i64>("t").unwrap() >= 0);
        assert!(g.get::<f64>("s").unwrap() >= 0.0);
        assert_eq!(g.get::<String>("os_name").unwrap(), std::env::consts::OS);
    }

    #[test]
    fn file_exists_checks_disk() {
        let path = temp_path("exists.txt");
        std::fs::write(&path, "x").unwrap();
        let (runtime, _) = headless_runtime("");
        runtime
            .exec_source(
                &format!("yes, no = util.file_exists({:?}), util.file_exists('nope.txt')", path.display().to_string()),
                "files",
            )
            .unwrap();
        let g = runtime.lua().globals();
        assert!(g.get::<bool>("yes").unwrap());
        assert!(!g.get::<bool>("no").unwrap());
    }

    #[test]
    fn quit_stops_the_engine() {
        let (_runtime, engine) = headless_runtime("util.quit()");
        assert!(!engine.borrow().is_running());
    }
}
