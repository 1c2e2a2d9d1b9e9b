//! `console` module: log output, code execution, window title.
//!
//! `console.log` and `console.error` format their arguments with Lua's
//! `tostring`, tab-separated like `print`, and send the line to the `log`
//! facade under the `script` target.
//!
//! `console.execute(code)` runs a string and reports failure as values
//! instead of raising, which is what an in-game console prompt wants:
//!
//! ```lua
//! local ok, err = console.execute(line)
//! if not ok then console.error(err) end
//! ```

use mlua::{Function, Lua, Value, Variadic};

use super::{borrow_engine, publish};
use crate::engine::SharedEngine;
use crate::logging::SCRIPT_TARGET;
use crate::render::GraphicsBackend;

fn join_args(lua: &Lua, args: Variadic<Value>) -> mlua::Result<String> {
    let tostring: Function = lua.globals().get("tostring")?;
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        parts.push(tostring.call::<String>(arg)?);
    }
    Ok(parts.join("\t"))
}

/// Run `code`, returning the error message instead of raising it.
fn execute(lua: &Lua, code: &str) -> (bool, Option<String>) {
    match lua.load(code).set_name("=console").exec() {
        Ok(()) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    }
}

pub(super) fn register<B: GraphicsBackend + 'static>(lua: &Lua, engine: &SharedEngine<B>) -> mlua::Result<()> {
    let console = lua.create_table()?;

    console.set(
        "log",
        lua.create_function(|lua, args: Variadic<Value>| {
            log::info!(target: SCRIPT_TARGET, "{}", join_args(lua, args)?);
            Ok(())
        })?,
    )?;

    console.set(
        "error",
        lua.create_function(|lua, args: Variadic<Value>| {
            log::error!(target: SCRIPT_TARGET, "{}", join_args(lua, args)?);
            Ok(())
        })?,
    )?;

    console.set(
        "execute",
        lua.create_function(|lua, code: String| Ok(execute(lua, &code)))?,
    )?;

    let e = engine.clone();
    console.set(
        "set_title",
        lua.create_function(move |_, title: String| {
            borrow_engine(&e)?.graphics.set_title(&title);
            Ok(())
        })?,
    )?;

    publish(lua, "console", console)
}

#[cfg(test)]
mod tests {
    use crate::testing::headless_runtime;

    #[test]
    fn execute_reports_syntax_errors() {
        let (runtime, _) = headless_runtime(r#"ok, msg = console.execute("x = = 1")"#);
        let g = runtime.lua().globals();
        assert!(!g.get::<bool>("ok").unwrap());
        assert!(g.get::<String>("msg").unwrap().contains("console"));
    }

    #[test]
    fn execute_reports_runtime_errors() {
        let (runtime, _) = headless_runtime(r#"ok, msg = console.execute("error('boom')")"#);
        let g = runtime.lua().globals();
        assert!(!g.get::<bool>("ok").unwrap());
        assert!(g.get::<String>("msg").unwrap().contains("boom"));
    }

    #[test]
    fn execute_runs_code_with_full_access() {
        let (runtime, _) = headless_runtime(
            r#"ok, msg = console.execute("value = 6 * 7; local w = texture.white()")"#,
        );
        let g = runtime.lua().globals();
        assert!(g.get::<bool>("ok").unwrap());
        assert!(g.get::<Option<String>>("msg").unwrap().is_none());
        assert_eq!(g.get::<i64>("value").unwrap(), 42);
    }

    #[test]
    fn log_accepts_any_values() {
        let (runtime, _) = headless_runtime("");
        runtime
            .exec_source("console.log('x', 1, nil, true, {}); console.error('bad', 2)", "log")
            .unwrap();
    }

    #[test]
    fn set_title_reaches_the_window() {
        let (_runtime, engine) = headless_runtime("console.set_title('fps: 60')");
        assert_eq!(engine.borrow().graphics.backend().title.as_deref(), Some("fps: 60"));
    }
}
