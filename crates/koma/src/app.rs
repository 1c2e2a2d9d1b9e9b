//! # App: Window, Event Loop and Boot Sequence
//!
//! [`App::run`] opens the window and blocks until the game quits:
//!
//! ```text
//! resumed ──► window ─► GPU ─► sprite pipeline ─► audio ─► Lua
//!                                                           │
//!                 ScriptRuntime::boot: boot script, _init() ┘
//!
//! RedrawRequested ──► poll gamepads ──► FrameDriver::tick ──► Continue: request_redraw
//!                                                        └──► Exit: leave the event loop
//! ```
//!
//! Any failure during boot ends the event loop and is returned from
//! [`App::run`]. Once the loop is running, only an out-of-memory GPU error is
//! fatal; script errors are handled by the [`FrameDriver`].

use std::path::PathBuf;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::audio::Audio;
use crate::config::EngineConfig;
use crate::driver::{FrameDriver, LoopControl, ShutdownReason};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::gamepad::Gamepads;
use crate::render::GpuContext;
use crate::render2d::{Graphics, WgpuBackend};
use crate::script::ScriptRuntime;

/// Runs a Lua game in a window.
pub struct App {
    config: EngineConfig,
    boot_script: PathBuf,
}

impl App {
    pub fn new(config: EngineConfig, boot_script: impl Into<PathBuf>) -> Self {
        Self {
            config,
            boot_script: boot_script.into(),
        }
    }

    /// Run until the window closes, the game quits, or something fatal
    /// happens.
    pub fn run(self) -> Result<ShutdownReason, EngineError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        log::info!(
            "Starting '{}' ({}x{} at {}x)",
            self.config.title,
            self.config.internal_width,
            self.config.internal_height,
            self.config.window_scale
        );

        let mut app = WinitApp {
            driver: FrameDriver::new(&self.config),
            config: self.config,
            boot_script: self.boot_script,
            window: None,
            gamepads: Gamepads::new(),
            runtime: None,
            outcome: None,
        };
        event_loop.run_app(&mut app)?;

        if let Some(runtime) = &app.runtime {
            runtime.engine().borrow_mut().graphics.shutdown();
        }

        match app.outcome.take() {
            Some(outcome) => outcome,
            None => Ok(ShutdownReason::Quit),
        }
    }
}

/// The application state that winit drives.
struct WinitApp {
    config: EngineConfig,
    boot_script: PathBuf,
    driver: FrameDriver,
    window: Option<Arc<Window>>,
    gamepads: Gamepads,
    runtime: Option<ScriptRuntime<WgpuBackend>>,
    outcome: Option<Result<ShutdownReason, EngineError>>,
}

impl WinitApp {
    fn boot(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EngineError> {
        let (width, height) = self.config.window_size();
        let attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(attrs)?);
        self.window = Some(window.clone());

        let gpu = GpuContext::new(window.clone(), self.config.vsync)?;
        let backend = WgpuBackend::new(window, gpu, self.config.max_sprites)?;
        let graphics = Graphics::new(backend, &self.config);
        let engine = Engine::new(graphics, Audio::new()).into_shared();

        self.runtime = Some(ScriptRuntime::boot(engine, &self.boot_script)?);
        Ok(())
    }
}

/// Record why the loop ended (first reason wins) and leave it.
fn stop(
    slot: &mut Option<Result<ShutdownReason, EngineError>>,
    event_loop: &ActiveEventLoop,
    outcome: Result<ShutdownReason, EngineError>,
) {
    if slot.is_none() {
        *slot = Some(outcome);
    }
    event_loop.exit();
}

impl ApplicationHandler for WinitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.boot(event_loop) {
            Ok(()) => {
                self.driver.start();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Err(e) => stop(&mut self.outcome, event_loop, Err(e)),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(runtime) = &self.runtime else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested, exiting.");
                runtime.engine().borrow_mut().quit();
                stop(&mut self.outcome, event_loop, Ok(ShutdownReason::Quit));
            }

            WindowEvent::Resized(size) => {
                runtime
                    .engine()
                    .borrow_mut()
                    .graphics
                    .backend_mut()
                    .resize(size.width, size.height);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    let mut engine = runtime.engine().borrow_mut();
                    match event.state {
                        ElementState::Pressed => engine.input.press(key_code),
                        ElementState::Released => engine.input.release(key_code),
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.gamepads.poll(&mut runtime.engine().borrow_mut().pad);

                match self.driver.tick(runtime) {
                    Ok(LoopControl::Continue) => {
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                    Ok(LoopControl::Exit(reason)) => {
                        log::info!("Frame loop stopped ({:?}) after {} frames", reason, self.driver.frames());
                        stop(&mut self.outcome, event_loop, Ok(reason));
                    }
                    Err(e) => {
                        log::error!("Fatal render error: {}", e);
                        stop(&mut self.outcome, event_loop, Err(e.into()));
                    }
                }
            }

            _ => {}
        }
    }
}
