use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use swatch_engine::core::{App as EngineApp, AppControl, FrameCtx};
use swatch_engine::device::{GpuInit, HeadlessGpu};
use swatch_engine::input::{InputEvent, InputState, Key};
use swatch_engine::paint::Color;
use swatch_engine::render::{Framebuffer, OffscreenTarget, RenderCtx, ShaderSource};
use swatch_engine::window::{Runtime, RuntimeConfig};

use crate::demo::Demo;
use crate::error::DemoError;
use crate::keymap::{KeyAction, KeyBindings};
use crate::palette::HandlerTable;

/// Top-level demo builder.
///
/// Configure the window, shaders, event handlers and key bindings, then
/// either open a window with [`run`](Application::run) or render one frame
/// offscreen with [`snapshot`](Application::snapshot).
///
/// ```rust,ignore
/// Application::new()
///     .title("swatch")
///     .on_event("color4", |_| Color::rgba(1.0, 1.0, 0.0, 1.0))
///     .bind_key(Key::Digit4, KeyAction::Activate("color4".into()))
///     .run()?;
/// ```
pub struct Application {
    title: String,
    width: f64,
    height: f64,
    shaders: ShaderSource,
    gpu_init: GpuInit,
    handlers: HandlerTable,
    keys: KeyBindings,
    /// Events fired, in order, before the first frame.
    replay: Vec<String>,
}

impl Application {
    pub fn new() -> Self {
        Self {
            title: "swatch".to_string(),
            width: 800.0,
            height: 600.0,
            shaders: ShaderSource::builtin(),
            gpu_init: GpuInit::default(),
            handlers: HandlerTable::with_defaults(),
            keys: KeyBindings::default(),
            replay: Vec::new(),
        }
    }

    /// Set the window title.
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Replace the built-in shader pair.
    pub fn shaders(mut self, source: ShaderSource) -> Self {
        self.shaders = source;
        self
    }

    pub fn gpu_init(mut self, init: GpuInit) -> Self {
        self.gpu_init = init;
        self
    }

    /// Register (or replace) the handler for an event id.
    pub fn on_event(mut self, id: impl Into<String>, f: impl Fn(Color) -> Color + 'static) -> Self {
        self.handlers.register(id, f);
        self
    }

    /// Bind a key in the windowed host.
    pub fn bind_key(mut self, key: Key, action: impl Into<KeyAction>) -> Self {
        self.keys.bind(key, action);
        self
    }

    /// Fire `id` once before the first frame is drawn.
    pub fn replay(mut self, id: impl Into<String>) -> Self {
        self.replay.push(id.into());
        self
    }

    // ── Entry points ──────────────────────────────────────────────────────

    /// Open the window and run until it is closed.
    ///
    /// Replayed events are checked before the window opens; an unknown id is
    /// an error.
    pub fn run(self) -> Result<()> {
        let config = RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.width, self.height),
        };

        let mut demo = Demo::new(self.handlers);
        replay(&mut demo, &self.replay)?;

        let state = DemoAppState {
            demo,
            shaders: self.shaders,
            keys: self.keys,
        };
        Runtime::run(config, self.gpu_init, state)
    }

    /// Render a single `width`×`height` frame without a window and read it
    /// back.
    pub fn snapshot(self, width: u32, height: u32) -> Result<Framebuffer> {
        let gpu = HeadlessGpu::new_blocking(&self.gpu_init).context("GPU initialization failed")?;
        let target = OffscreenTarget::new(gpu.device(), width, height)?;
        let ctx = gpu.render_ctx(target.format());

        let mut demo = Demo::new(self.handlers);
        demo.initialize(&ctx, &self.shaders)?;
        replay(&mut demo, &self.replay)?;

        let mut rendered = Ok(());
        target.render_with(&ctx, |rctx, t| rendered = demo.render(rctx, t));
        rendered?;

        target.read_pixels(&ctx)
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

fn replay(demo: &mut Demo, events: &[String]) -> Result<(), DemoError> {
    for id in events {
        demo.activate(id)?;
    }
    Ok(())
}

// ── DemoAppState ──────────────────────────────────────────────────────────

/// Internal state that implements `swatch_engine::core::App`.
struct DemoAppState {
    demo: Demo,
    shaders: ShaderSource,
    keys: KeyBindings,
}

impl DemoAppState {
    fn handle_key(&mut self, key: Key) -> AppControl {
        match self.keys.action_for(key) {
            Some(KeyAction::Activate(id)) => match self.demo.activate(id) {
                Ok(_) => AppControl::Redraw,
                Err(e) => {
                    log::warn!("{e}");
                    AppControl::Continue
                }
            },
            Some(KeyAction::Quit) => AppControl::Exit,
            None => AppControl::Continue,
        }
    }
}

impl EngineApp for DemoAppState {
    fn on_gpu_ready(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        self.demo.initialize(ctx, &self.shaders)?;
        Ok(())
    }

    fn on_input(&mut self, event: &InputEvent, _input: &InputState) -> AppControl {
        match event.pressed_key() {
            Some(key) => self.handle_key(key),
            None => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let demo = &self.demo;
        ctx.present(|rctx, target| {
            if let Err(e) = demo.render(rctx, target) {
                log::error!("frame skipped: {e}");
            }
        })
    }
}
