//! # Script: The Lua Bridge
//!
//! Games are written in Lua. [`ScriptRuntime`] owns the Lua state, registers
//! the native modules, runs the boot script, and calls the three frame
//! callbacks:
//!
//! | Callback      | When                          |
//! |---------------|-------------------------------|
//! | `_init()`     | once, after the boot script   |
//! | `_update(dt)` | once per fixed update step    |
//! | `_draw()`     | once per rendered frame       |
//!
//! A callback that is not defined (or is not a function) is skipped.
//!
//! ## Native Modules
//!
//! Each module is a plain table of functions, set as a global and in
//! `package.loaded` so both `batch.draw(...)` and `local batch = require
//! "batch"` work:
//!
//! - `batch`, `texture`: sprite drawing ([`graphics`])
//! - `input`: keyboard state by key name
//! - `audio`: sound effects, music, volume
//! - `util`: clock, platform, file checks, quit
//! - `console`: logging, `execute`, window title
//! - `sandbox`: run files in an isolated environment
//!
//! ## Sharing the Engine
//!
//! Native functions capture a [`SharedEngine`] and borrow it only for the
//! duration of the call. Functions that run Lua code (`console.execute`,
//! `sandbox.*`) never borrow it, so scripts they run can use every module.
//! A borrow conflict is reported to Lua as an error instead of panicking.

mod audio;
mod console;
mod graphics;
mod input;
mod sandbox;
mod util;

use std::cell::RefMut;
use std::path::Path;

use mlua::{Lua, Table, Value};

use crate::engine::{Engine, SharedEngine};
use crate::error::ScriptError;
use crate::render::GraphicsBackend;

/// The Lua state plus the engine its modules operate on.
pub struct ScriptRuntime<B: GraphicsBackend + 'static> {
    lua: Lua,
    engine: SharedEngine<B>,
}

impl<B: GraphicsBackend + 'static> ScriptRuntime<B> {
    /// Create a Lua state with every native module registered.
    pub fn new(engine: SharedEngine<B>) -> Result<Self, ScriptError> {
        let lua = Lua::new();
        graphics::register(&lua, &engine)?;
        input::register(&lua, &engine)?;
        audio::register(&lua, &engine)?;
        util::register(&lua, &engine)?;
        console::register(&lua, &engine)?;
        sandbox::register(&lua)?;
        Ok(Self { lua, engine })
    }

    /// Run a script file. Its directory is added to `package.path` so it can
    /// `require` its siblings.
    ///
    /// The file is loaded as raw bytes, so comments in any encoding are fine.
    pub fn exec_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read(path).map_err(|source| ScriptError::Io {
            path: path.to_owned(),
            source,
        })?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.add_search_dir(dir)?;
        }
        log::info!("running {}", path.display());
        self.lua
            .load(&source[..])
            .set_name(format!("@{}", path.display()))
            .exec()?;
        Ok(())
    }

    /// Create the runtime, run the boot script, then call `_init`.
    pub fn boot(engine: SharedEngine<B>, script: &Path) -> Result<Self, ScriptError> {
        let runtime = Self::new(engine)?;
        runtime.exec_file(script)?;
        runtime.call_init()?;
        Ok(runtime)
    }

    /// Run a chunk of Lua source. `name` appears in error messages.
    pub fn exec_source(&self, source: &str, name: &str) -> Result<(), ScriptError> {
        self.lua.load(source).set_name(format!("={name}")).exec()?;
        Ok(())
    }

    pub fn call_init(&self) -> mlua::Result<()> {
        self.call_callback("_init", ())
    }

    pub fn call_update(&self, dt: f64) -> mlua::Result<()> {
        self.call_callback("_update", dt)
    }

    pub fn call_draw(&self) -> mlua::Result<()> {
        self.call_callback("_draw", ())
    }

    pub fn engine(&self) -> &SharedEngine<B> {
        &self.engine
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    fn call_callback(&self, name: &str, args: impl mlua::IntoLuaMulti) -> mlua::Result<()> {
        match self.lua.globals().get::<Value>(name)? {
            Value::Function(f) => f.call::<()>(args),
            _ => Ok(()),
        }
    }

    fn add_search_dir(&self, dir: &Path) -> mlua::Result<()> {
        let package: Table = self.lua.globals().get("package")?;
        let current: String = package.get("path")?;
        let dir = dir.display();
        package.set("path", format!("{dir}/?.lua;{dir}/?/init.lua;{current}"))
    }
}

/// Set `module` as global `name` and as `package.loaded[name]`.
fn publish(lua: &Lua, name: &str, module: Table) -> mlua::Result<()> {
    let globals = lua.globals();
    let loaded: Table = globals.get::<Table>("package")?.get("loaded")?;
    loaded.set(name, module.clone())?;
    globals.set(name, module)
}

/// Borrow the engine for one native call.
fn borrow_engine<B: GraphicsBackend>(engine: &SharedEngine<B>) -> mlua::Result<RefMut<'_, Engine<B>>> {
    engine
        .try_borrow_mut()
        .map_err(|_| mlua::Error::RuntimeError("engine is busy (re-entrant native call)".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::testing::{headless_engine, headless_runtime, temp_path};

    #[test]
    fn missing_callbacks_are_skipped() {
        let (runtime, _) = headless_runtime("_draw = 42");
        runtime.call_init().unwrap();
        runtime.call_update(1.0 / 60.0).unwrap();
        runtime.call_draw().unwrap();
    }

    #[test]
    fn callbacks_receive_dt() {
        let (runtime, _) = headless_runtime("total = 0\nfunction _update(dt) total = total + dt end");
        runtime.call_update(0.5).unwrap();
        runtime.call_update(0.25).unwrap();
        let total: f64 = runtime.lua().globals().get("total").unwrap();
        assert_eq!(total, 0.75);
    }

    #[test]
    fn callback_errors_surface() {
        let (runtime, _) = headless_runtime("function _draw() error('bad frame') end");
        let err = runtime.call_draw().unwrap_err();
        assert!(err.to_string().contains("bad frame"));
    }

    #[test]
    fn modules_are_requirable() {
        let (runtime, _) = headless_runtime(
            r#"
            same = require("batch") == batch
                and require("texture") == texture
                and require("input") == input
                and require("audio") == audio
                and require("util") == util
                and require("console") == console
                and require("sandbox") == sandbox
            "#,
        );
        let same: bool = runtime.lua().globals().get("same").unwrap();
        assert!(same);
    }

    #[test]
    fn boot_script_can_require_siblings() {
        let dir = temp_path("req");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("helper.lua"), "return { answer = 42 }").unwrap();
        std::fs::write(dir.join("main.lua"), "answer = require('helper').answer").unwrap();

        let (runtime, _) = headless_runtime("");
        runtime.exec_file(&dir.join("main.lua")).unwrap();
        let answer: i64 = runtime.lua().globals().get("answer").unwrap();
        assert_eq!(answer, 42);
    }

    #[test]
    fn missing_boot_script_is_an_io_error() {
        let (runtime, _) = headless_runtime("");
        let err = runtime.exec_file(std::path::Path::new("no/such/main.lua")).unwrap_err();
        assert!(matches!(err, crate::error::ScriptError::Io { .. }));
    }

    fn boot_file(name: &str, source: &[u8]) -> std::path::PathBuf {
        let path = temp_path(name);
        std::fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn boot_runs_init_once() {
        let path = boot_file("boot_ok.lua", b"inits = 0\nfunction _init() inits = inits + 1 end");
        let runtime = ScriptRuntime::boot(headless_engine().into_shared(), &path).unwrap();
        assert_eq!(runtime.lua().globals().get::<i64>("inits").unwrap(), 1);
    }

    #[test]
    fn failing_init_is_a_boot_error() {
        let path = boot_file("boot_init.lua", b"function _init() error('no save file') end");
        let err = ScriptRuntime::boot(headless_engine().into_shared(), &path)
            .err()
            .unwrap();
        assert!(matches!(err, ScriptError::Lua(_)));
        assert!(err.to_string().contains("no save file"));
        assert!(matches!(EngineError::from(err), EngineError::Script(_)));
    }

    #[test]
    fn boot_failures_are_script_errors() {
        let engine = headless_engine().into_shared();
        let missing = ScriptRuntime::boot(engine.clone(), Path::new("no/such/main.lua")).err().unwrap();
        assert!(matches!(missing, ScriptError::Io { .. }));

        let path = boot_file("boot_syntax.lua", b"function _init(");
        let syntax = ScriptRuntime::boot(engine, &path).err().unwrap();
        assert!(matches!(syntax, ScriptError::Lua(_)));
    }

    #[test]
    fn boot_accepts_non_utf8_source() {
        let path = boot_file("boot_latin1.lua", b"-- se\xf1al\nready = true");
        let runtime = ScriptRuntime::boot(headless_engine().into_shared(), &path).unwrap();
        assert!(runtime.lua().globals().get::<bool>("ready").unwrap());
    }
}
