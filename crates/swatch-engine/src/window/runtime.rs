use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputFrame, InputState};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "swatch".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn request_redraw(&mut self) {
        self.commands.push(Command::Redraw);
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }
}

enum Command {
    Redraw,
    Exit,
}

/// Entry point for the runtime.
///
/// Opens one window, creates its GPU context and drives the app until the
/// window closes or the app asks to exit.
pub struct Runtime;

impl Runtime {
    /// Blocks until the event loop ends.
    ///
    /// Window or GPU initialization failures, and errors from
    /// [`CoreApp::on_gpu_ready`], end the loop and are returned here.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            window: None,
            exit_requested: false,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal.get_or_insert(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = &self.gpu_init;
        let entry = WindowEntry::try_new(
            InputState::default(),
            InputFrame::default(),
            window,
            |w| pollster::block_on(Gpu::new(w, gpu_init)),
        )
        .context("GPU initialization failed")?;

        let app = &mut self.app;
        entry
            .with_gpu(|gpu| app.on_gpu_ready(&gpu.render_ctx()))
            .context("application setup failed")?;

        Ok(entry)
    }

    /// Applies a control directive from an app callback.
    fn handle_control(&mut self, event_loop: &ActiveEventLoop, control: AppControl) {
        match control {
            AppControl::Continue => {}
            AppControl::Redraw => self.redraw(event_loop),
            AppControl::Exit => {
                self.exit_requested = true;
                event_loop.exit();
            }
        }
    }

    /// Draws one frame right away.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let mut runtime_ctx = RuntimeCtx::default();
        let mut app_control = AppControl::Continue;

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else {
            return;
        };

        entry.with_mut(|fields| {
            // Scope to ensure `ctx` is dropped before mutating frame state.
            {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        id: fields.window.id(),
                        window: fields.window,
                    },
                    gpu: fields.gpu,
                    input: fields.input_state,
                    input_frame: fields.input_frame,
                    runtime: &mut runtime_ctx,
                };

                app_control = app.on_frame(&mut ctx);
            }

            // Clear per-frame deltas after the frame is consumed.
            fields.input_frame.clear();
        });

        match app_control {
            // A reconfigured surface wants another frame; let the loop deliver it.
            AppControl::Redraw => runtime_ctx.request_redraw(),
            AppControl::Exit => runtime_ctx.exit(),
            AppControl::Continue => {}
        }

        self.apply_commands(event_loop, runtime_ctx);
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::Redraw => {
                    if let Some(entry) = &self.window {
                        entry.with_window(|w| w.request_redraw());
                    }
                }
                Command::Exit => self.exit_requested = true,
            }
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.window = Some(entry);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Frames are only drawn on demand.
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else {
            return;
        };

        let mut control = AppControl::Continue;
        entry.with_mut(|fields| {
            if let Some(ev) = translate_window_event(fields.input_state, &event) {
                fields.input_state.apply_event(fields.input_frame, ev.clone());
                control = app.on_input(&ev, fields.input_state);
            }
        });
        self.handle_control(event_loop, control);

        // Runtime-managed window lifecycle / resize / redraw handling.
        match &event {
            WindowEvent::CloseRequested => {
                self.window = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
