//! `sandbox` module: run a file with its own global table.
//!
//! The environment starts empty with `__index` pointing at the real globals,
//! so the file can read every module and library, while anything it assigns
//! stays in the environment. Useful for levels or mods that should not leak
//! names into the game.
//!
//! ```lua
//! local level, err = sandbox.dofile("levels/1-1.lua")
//! if not level then console.error(err) return end
//! spawn(level.enemies)
//! ```

use mlua::{Function, IntoLuaMulti, Lua, MultiValue, Table, Value};

use super::publish;

fn sandbox_env(lua: &Lua) -> mlua::Result<Table> {
    let env = lua.create_table()?;
    let meta = lua.create_table()?;
    meta.set("__index", lua.globals())?;
    env.set_metatable(Some(meta));
    Ok(env)
}

/// Read and compile `path` with `env` as its global table.
fn load_in(lua: &Lua, path: &str, env: Table) -> mlua::Result<Function> {
    let source = std::fs::read(path).map_err(|e| mlua::Error::RuntimeError(format!("cannot open {path}: {e}")))?;
    lua.load(&source[..])
        .set_name(format!("@{path}"))
        .set_environment(env)
        .into_function()
}

pub(super) fn register(lua: &Lua) -> mlua::Result<()> {
    let sandbox = lua.create_table()?;

    sandbox.set(
        "loadfile",
        lua.create_function(|lua, path: String| -> mlua::Result<MultiValue> {
            let env = sandbox_env(lua)?;
            match load_in(lua, &path, env.clone()) {
                Ok(chunk) => (chunk, env).into_lua_multi(lua),
                Err(e) => (Value::Nil, Value::Nil, e.to_string()).into_lua_multi(lua),
            }
        })?,
    )?;

    sandbox.set(
        "dofile",
        lua.create_function(|lua, path: String| -> mlua::Result<MultiValue> {
            let env = sandbox_env(lua)?;
            let result = load_in(lua, &path, env.clone()).and_then(|chunk| chunk.call::<()>(()));
            match result {
                Ok(()) => env.into_lua_multi(lua),
                Err(e) => (Value::Nil, e.to_string()).into_lua_multi(lua),
            }
        })?,
    )?;

    publish(lua, "sandbox", sandbox)
}
