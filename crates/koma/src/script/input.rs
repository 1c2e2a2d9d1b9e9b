//! `input` module: keyboard state by key name.
//!
//! `input.down` also answers true while the gamepad button mapped to the key
//! ([`button_for_key`]) is held, so `down("z")` works with the pad's south
//! button. Edge queries are keyboard only.
//!
//! ```lua
//! if input.down("left") then x = x - 1 end
//! if input.pressed("z") then jump() end
//! ```
//!
//! Names are listed on [`key_from_name`]. An unknown name raises an error so
//! typos show up immediately.

use mlua::Lua;

use super::{borrow_engine, publish};
use crate::engine::SharedEngine;
use crate::input::{KeyCode, button_for_key, key_from_name};
use crate::render::GraphicsBackend;

fn key_arg(name: &str) -> mlua::Result<KeyCode> {
    key_from_name(name).ok_or_else(|| mlua::Error::RuntimeError(format!("unknown key name '{name}'")))
}

pub(super) fn register<B: GraphicsBackend + 'static>(lua: &Lua, engine: &SharedEngine<B>) -> mlua::Result<()> {
    let input = lua.create_table()?;

    let e = engine.clone();
    let down = lua.create_function(move |_, name: String| {
        let key = key_arg(&name)?;
        let engine = borrow_engine(&e)?;
        let pad_down = button_for_key(key).is_some_and(|button| engine.pad.pressed(button));
        Ok(engine.input.pressed(key) || pad_down)
    })?;
    input.set("down", down.clone())?;
    input.set("is_down", down)?;

    let e = engine.clone();
    input.set(
        "pressed",
        lua.create_function(move |_, name: String| {
            let key = key_arg(&name)?;
            Ok(borrow_engine(&e)?.input.just_pressed(key))
        })?,
    )?;

    let e = engine.clone();
    input.set(
        "released",
        lua.create_function(move |_, name: String| {
            let key = key_arg(&name)?;
            Ok(borrow_engine(&e)?.input.just_released(key))
        })?,
    )?;

    publish(lua, "input", input)
}

#[cfg(test)]
mod tests {
    use crate::input::{Button, KeyCode};
    use crate::testing::headless_runtime;

    #[test]
    fn reflects_engine_state() {
        let (runtime, engine) = headless_runtime("");
        engine.borrow_mut().input.press(KeyCode::ArrowLeft);
        runtime
            .exec_source(
                "a, b, c, d = input.down('left'), input.is_down('LEFT'), input.pressed('left'), input.down('right')",
                "keys",
            )
            .unwrap();
        let g = runtime.lua().globals();
        assert!(g.get::<bool>("a").unwrap());
        assert!(g.get::<bool>("b").unwrap());
        assert!(g.get::<bool>("c").unwrap());
        assert!(!g.get::<bool>("d").unwrap());

        engine.borrow_mut().input.clear_just();
        engine.borrow_mut().input.release(KeyCode::ArrowLeft);
        runtime.exec_source("p, r = input.pressed('left'), input.released('left')", "edges").unwrap();
        assert!(!g.get::<bool>("p").unwrap());
        assert!(g.get::<bool>("r").unwrap());
    }

    #[test]
    fn down_includes_mapped_pad_buttons() {
        let (runtime, engine) = headless_runtime("");
        engine.borrow_mut().pad.press(Button::South);
        engine.borrow_mut().pad.press(Button::DPadRight);
        runtime
            .exec_source(
                "z, right, x, pz = input.down('z'), input.is_down('right'), input.down('x'), input.pressed('z')",
                "pad",
            )
            .unwrap();
        let g = runtime.lua().globals();
        assert!(g.get::<bool>("z").unwrap());
        assert!(g.get::<bool>("right").unwrap());
        assert!(!g.get::<bool>("x").unwrap());
        assert!(!g.get::<bool>("pz").unwrap());

        engine.borrow_mut().pad.release(Button::South);
        runtime.exec_source("z = input.down('z')", "pad").unwrap();
        assert!(!g.get::<bool>("z").unwrap());
    }

    #[test]
    fn unknown_key_name_errors() {
        let (runtime, _) = headless_runtime("");
        let err = runtime.exec_source("input.down('jump')", "bad").unwrap_err();
        assert!(err.to_string().contains("unknown key name 'jump'"));
    }
}
