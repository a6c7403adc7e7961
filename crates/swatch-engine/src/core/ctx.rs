use winit::window::{Window, WindowId};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::render::{RenderCtx, RenderTarget};
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires the next surface image, calls `draw` with a ready
    /// [`RenderCtx`] and [`RenderTarget`], then presents.
    ///
    /// `draw` owns the whole pass, clearing included. Surface errors are
    /// handled here: a lost surface is reconfigured and another frame is
    /// requested, an out-of-memory surface ends the run.
    pub fn present<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        if !self.gpu.is_drawable() {
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::warn!("surface error: {err}");
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured => AppControl::Redraw,
                    SurfaceErrorAction::SkipFrame => AppControl::Continue,
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface is unrecoverable; exiting");
                        AppControl::Exit
                    }
                };
            }
        };

        let rctx = self.gpu.render_ctx();

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
