use crate::input::{InputEvent, InputState};
use crate::render::RenderCtx;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    /// Nothing visible changed.
    Continue,
    /// Draw a new frame now.
    Redraw,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// The runtime never redraws on its own schedule; a frame is drawn when the
/// window first appears, after resizes, and whenever a callback returns
/// [`AppControl::Redraw`].
pub trait App {
    /// Called once, after the GPU context exists and before the first frame.
    ///
    /// An error here stops the runtime and is returned from `Runtime::run`.
    fn on_gpu_ready(&mut self, ctx: &RenderCtx<'_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for every translated input event, after `input` was updated.
    fn on_input(&mut self, event: &InputEvent, input: &InputState) -> AppControl {
        let _ = (event, input);
        AppControl::Continue
    }

    /// Called once per drawn frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
