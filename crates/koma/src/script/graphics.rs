//! `batch` and `texture` modules.
//!
//! ```lua
//! local hero, w, h = texture.load("gfx/hero.png")
//! batch.draw(hero, x, y, 16, 16,  0, 0, 16, 16)             -- plain
//! batch.draw(hero, x, y, 16, 16, 16, 0, 16, 16, true)       -- mirrored
//! batch.draw(hero, x, y, 16, 16,  0, 0, 16, 16, false, 1, 0, 0, 0.5)
//! ```
//!
//! Source rectangles are in texture pixels. The tint applies only when r, g
//! and b are all given; alpha defaults to 1.

use mlua::Lua;

use super::{borrow_engine, publish};
use crate::engine::SharedEngine;
use crate::math::{SourceRect, Vec2};
use crate::render::GraphicsBackend;
use crate::render2d::{Color, SpriteDraw, TextureHandle};

/// handle, x, y, w, h, sx, sy, sw, sh, flip?, r?, g?, b?, a?
type DrawArgs = (
    u32,
    f32,
    f32,
    f32,
    f32,
    f32,
    f32,
    f32,
    f32,
    Option<bool>,
    Option<f32>,
    Option<f32>,
    Option<f32>,
    Option<f32>,
);

fn sprite_from_args(args: DrawArgs) -> SpriteDraw {
    let (handle, x, y, w, h, sx, sy, sw, sh, flip, r, g, b, a) = args;
    let mut sprite = SpriteDraw::new(
        TextureHandle::from_raw(handle),
        Vec2::new(x, y),
        Vec2::new(w, h),
        SourceRect::new(sx, sy, sw, sh),
    );
    if flip.unwrap_or(false) {
        sprite = sprite.flipped();
    }
    if let (Some(r), Some(g), Some(b)) = (r, g, b) {
        sprite = sprite.color(Color::rgba(r, g, b, a.unwrap_or(1.0)));
    }
    sprite
}

pub(super) fn register<B: GraphicsBackend + 'static>(lua: &Lua, engine: &SharedEngine<B>) -> mlua::Result<()> {
    let batch = lua.create_table()?;

    let e = engine.clone();
    batch.set(
        "draw",
        lua.create_function(move |_, args: DrawArgs| {
            let sprite = sprite_from_args(args);
            borrow_engine(&e)?
                .graphics
                .draw(&sprite)
                .map_err(mlua::Error::external)
        })?,
    )?;

    let e = engine.clone();
    batch.set(
        "set_camera",
        lua.create_function(move |_, (x, y): (f32, f32)| {
            borrow_engine(&e)?.graphics.set_camera(x, y);
            Ok(())
        })?,
    )?;

    let e = engine.clone();
    batch.set(
        "begin",
        lua.create_function(move |_, ()| {
            borrow_engine(&e)?.graphics.begin();
            Ok(())
        })?,
    )?;

    let e = engine.clone();
    let flush = lua.create_function(move |_, ()| {
        borrow_engine(&e)?
            .graphics
            .flush()
            .map_err(mlua::Error::external)
    })?;
    batch.set("flush", flush.clone())?;
    batch.set("end", flush)?;

    let e = engine.clone();
    batch.set(
        "stats",
        lua.create_function(move |lua, ()| {
            let stats = borrow_engine(&e)?.graphics.stats();
            let t = lua.create_table()?;
            t.set("draw_calls", stats.draw_calls)?;
            t.set("quads", stats.quads)?;
            t.set("vertices", stats.vertices)?;
            Ok(t)
        })?,
    )?;

    publish(lua, "batch", batch)?;

    let texture = lua.create_table()?;

    let e = engine.clone();
    texture.set(
        "load",
        lua.create_function(move |_, path: String| {
            let tex = borrow_engine(&e)?.graphics.load_texture(&path);
            Ok((tex.handle.id(), tex.width, tex.height))
        })?,
    )?;

    let e = engine.clone();
    texture.set(
        "white",
        lua.create_function(move |_, ()| {
            let tex = borrow_engine(&e)?.graphics.white_texture();
            Ok((tex.handle.id(), tex.width, tex.height))
        })?,
    )?;

    publish(lua, "texture", texture)
}
