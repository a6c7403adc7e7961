use swatch_engine::paint::Color;
use swatch_engine::render::{FrameRenderer, Program, RenderCtx, RenderTarget, ShaderSource};

use crate::error::DemoError;
use crate::palette::{HandlerTable, DEFAULT_COLOR};

enum Stage {
    Uninitialized,
    Ready(FrameRenderer),
}

/// Demo state: the current color, the event handlers, and the renderer once
/// the pipeline is up.
///
/// Passed explicitly to whatever drives frames; nothing here is global.
pub struct Demo {
    color: Color,
    handlers: HandlerTable,
    stage: Stage,
}

impl Demo {
    pub fn new(handlers: HandlerTable) -> Self {
        Self {
            color: DEFAULT_COLOR,
            handlers,
            stage: Stage::Uninitialized,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.stage, Stage::Ready(_))
    }

    /// Builds the program for `ctx.target_format` and moves to the ready
    /// state.
    ///
    /// On error the demo stays uninitialized. Once ready, further calls are
    /// ignored.
    pub fn initialize(&mut self, ctx: &RenderCtx<'_>, source: &ShaderSource) -> Result<(), DemoError> {
        if self.is_ready() {
            log::warn!("demo already initialized; ignoring");
            return Ok(());
        }

        let program = Program::build(ctx, source)?;
        self.stage = Stage::Ready(FrameRenderer::new(ctx, program));
        log::info!("demo ready");
        Ok(())
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Runs the handler registered for `id` and stores its result as the
    /// current color.
    pub fn activate(&mut self, id: &str) -> Result<Color, DemoError> {
        let next = self.handlers.apply(id, self.color)?;
        log::debug!("event `{id}`: {:?} -> {:?}", self.color, next);
        self.set_color(next);
        Ok(next)
    }

    /// Records one frame with the current color.
    pub fn render(&self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> Result<(), DemoError> {
        match &self.stage {
            Stage::Uninitialized => Err(DemoError::NotReady),
            Stage::Ready(renderer) => Ok(renderer.render(ctx, target, self.color)?),
        }
    }
}

impl Default for Demo {
    fn default() -> Self {
        Self::new(HandlerTable::with_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::gpu_or_skip;
    use swatch_engine::render::{OffscreenTarget, PipelineError, ShaderStage, SOLID_COLOR_FRAGMENT};

    #[test]
    fn starts_red_and_uninitialized() {
        let demo = Demo::default();
        assert_eq!(demo.color(), Color::rgba(1.0, 0.0, 0.0, 1.0));
        assert!(!demo.is_ready());
    }

    #[test]
    fn activation_updates_current_color() {
        let mut demo = Demo::default();
        assert_eq!(demo.activate("color2").unwrap(), Color::GREEN);
        assert_eq!(demo.color(), Color::GREEN);
        assert_eq!(demo.activate("color3").unwrap(), Color::BLUE);
        assert_eq!(demo.activate("colorReset").unwrap(), Color::RED);
        assert_eq!(demo.color(), Color::RED);
    }

    #[test]
    fn unknown_activation_keeps_color() {
        let mut demo = Demo::default();
        demo.activate("color3").unwrap();
        assert!(matches!(demo.activate("nope"), Err(DemoError::UnknownEvent(_))));
        assert_eq!(demo.color(), Color::BLUE);
    }

    #[test]
    fn render_before_initialize_is_refused() {
        let Some(gpu) = gpu_or_skip() else { return };
        let ctx = gpu.render_ctx(OffscreenTarget::FORMAT);
        let target = OffscreenTarget::new(ctx.device, 8, 8).unwrap();

        let demo = Demo::default();
        let mut result = Ok(());
        target.render_with(&ctx, |rctx, t| result = demo.render(rctx, t));
        assert!(matches!(result, Err(DemoError::NotReady)));
    }

    #[test]
    fn render_on_foreign_target_format_is_an_error() {
        let Some(gpu) = gpu_or_skip() else { return };
        let mut demo = Demo::default();
        demo.initialize(&gpu.render_ctx(wgpu::TextureFormat::Bgra8Unorm), &ShaderSource::builtin())
            .unwrap();

        let ctx = gpu.render_ctx(OffscreenTarget::FORMAT);
        let target = OffscreenTarget::new(ctx.device, 8, 8).unwrap();
        let mut result = Ok(());
        target.render_with(&ctx, |rctx, t| result = demo.render(rctx, t));

        match result {
            Err(DemoError::TargetFormat(mismatch)) => {
                assert_eq!(mismatch.target, OffscreenTarget::FORMAT);
                assert_eq!(mismatch.program, wgpu::TextureFormat::Bgra8Unorm);
            }
            other => panic!("expected a format error, got {other:?}"),
        }
    }

    #[test]
    fn failed_initialization_stays_uninitialized() {
        let Some(gpu) = gpu_or_skip() else { return };
        let ctx = gpu.render_ctx(OffscreenTarget::FORMAT);

        let mut demo = Demo::default();
        let source = ShaderSource::new("@vertex fn vs_main( {", SOLID_COLOR_FRAGMENT);
        let err = demo.initialize(&ctx, &source).unwrap_err();

        assert!(matches!(
            err,
            DemoError::Pipeline(PipelineError::ShaderCompile { stage: ShaderStage::Vertex, .. })
        ));
        assert!(!demo.is_ready());
    }

    #[test]
    fn initialize_once() {
        let Some(gpu) = gpu_or_skip() else { return };
        let ctx = gpu.render_ctx(OffscreenTarget::FORMAT);

        let mut demo = Demo::default();
        demo.initialize(&ctx, &ShaderSource::builtin()).unwrap();
        assert!(demo.is_ready());

        // Ready is terminal: even a broken source is ignored now.
        demo.initialize(&ctx, &ShaderSource::new("x", "y")).unwrap();
        assert!(demo.is_ready());
    }
}
