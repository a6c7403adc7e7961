use super::compile::{compile_stage, CompiledStage};
use super::ctx::RenderCtx;
use super::error::PipelineError;
use super::link::{link, ProgramLayout, COLOR_BINDING};
use super::quad::QuadVertex;
use super::shader::{ShaderSource, ShaderStage};

/// Byte size of the color uniform (`vec4<f32>`).
pub(crate) const COLOR_UNIFORM_SIZE: u64 = 16;

/// Linked shader program: a render pipeline plus the layout of its color
/// uniform.
///
/// The only way to obtain one is [`Program::build`], so holding a `Program`
/// means compile and link succeeded.
pub struct Program {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    target_format: wgpu::TextureFormat,
}

impl Program {
    /// Compiles both stages, links them, and creates the GPU pipeline for
    /// `ctx.target_format`.
    ///
    /// The vertex stage is compiled first; its failure short-circuits.
    pub fn build(ctx: &RenderCtx<'_>, source: &ShaderSource) -> Result<Self, PipelineError> {
        let (vertex, fragment, layout) = compile_and_link(source).inspect_err(|e| {
            log::error!("{e}");
        })?;

        let program = Self::create(ctx, &vertex, &fragment, layout).inspect_err(|e| {
            log::error!("{e}");
        })?;
        log::info!(
            "shader program ready (vs `{}`, fs `{}`, target {:?})",
            vertex.entry_point,
            fragment.entry_point,
            ctx.target_format
        );
        Ok(program)
    }

    /// Runs compile + link without touching the GPU.
    pub fn check(source: &ShaderSource) -> Result<(), PipelineError> {
        compile_and_link(source).map(|_| ())
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    pub(crate) fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub(crate) fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Creates the GPU objects. Validation errors raised by the driver here
    /// (e.g. a target format the fragment output cannot be written to) are
    /// reported as link errors.
    fn create(
        ctx: &RenderCtx<'_>,
        vertex: &CompiledStage<'_>,
        fragment: &CompiledStage<'_>,
        layout: ProgramLayout,
    ) -> Result<Self, PipelineError> {
        let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vs_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("swatch vertex stage"),
            source: wgpu::ShaderSource::Wgsl(vertex.source.into()),
        });
        let fs_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("swatch fragment stage"),
            source: wgpu::ShaderSource::Wgsl(fragment.source.into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("swatch color bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: COLOR_BINDING,
                        visibility: layout.color_visibility,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(COLOR_UNIFORM_SIZE),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("swatch pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("swatch pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: Some(vertex.entry_point.as_str()),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs_module,
                entry_point: Some(fragment.entry_point.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(PipelineError::ShaderLink { log: err.to_string() });
        }

        Ok(Self {
            pipeline,
            bind_group_layout,
            target_format: ctx.target_format,
        })
    }
}

fn compile_and_link(
    source: &ShaderSource,
) -> Result<(CompiledStage<'_>, CompiledStage<'_>, ProgramLayout), PipelineError> {
    let vertex = compile_stage(ShaderStage::Vertex, source.vertex())?;
    let fragment = compile_stage(ShaderStage::Fragment, source.fragment())?;
    let layout = link(&vertex, &fragment)?;
    Ok((vertex, fragment, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::testing::headless_or_skip;
    use crate::render::shader::{PASSTHROUGH_VERTEX, SOLID_COLOR_FRAGMENT};

    #[test]
    fn builtin_source_checks() {
        Program::check(&ShaderSource::builtin()).unwrap();
    }

    #[test]
    fn vertex_syntax_error_yields_compile_error() {
        let source = ShaderSource::new(
            "@vertex fn vs_main(@location(0) p: vec2<f32>) -> @builtin(position) vec4<f32> { return vec4<f32>(p, 0.0, 1.0) ",
            SOLID_COLOR_FRAGMENT,
        );
        let err = Program::check(&source).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShaderCompile { stage: ShaderStage::Vertex, .. }
        ));
    }

    #[test]
    fn vertex_failure_short_circuits_fragment() {
        // Both stages are broken; only the vertex error is reported.
        let source = ShaderSource::new("fn (", "also broken");
        let err = Program::check(&source).unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStage::Vertex));
    }

    #[test]
    fn fragment_syntax_error_yields_compile_error() {
        let source = ShaderSource::new(PASSTHROUGH_VERTEX, "@fragment fn");
        let err = Program::check(&source).unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStage::Fragment));
        assert!(err.to_string().starts_with("failed to compile fragment shader"));
    }

    #[test]
    fn builtin_program_builds_on_gpu() {
        let Some(gpu) = headless_or_skip() else { return };
        let ctx = gpu.render_ctx(wgpu::TextureFormat::Rgba8Unorm);

        let program = Program::build(&ctx, &ShaderSource::builtin()).unwrap();
        assert_eq!(program.target_format(), wgpu::TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn unwritable_target_format_is_a_link_error() {
        let Some(gpu) = headless_or_skip() else { return };
        // A float color output cannot be written to an integer target.
        let ctx = gpu.render_ctx(wgpu::TextureFormat::Rgba8Uint);

        let result = Program::build(&ctx, &ShaderSource::builtin());
        match result {
            Err(PipelineError::ShaderLink { log }) => assert!(!log.is_empty()),
            Err(other) => panic!("expected a link error, got {other}"),
            Ok(_) => panic!("pipeline for an integer target should not link"),
        }
    }

    #[test]
    fn build_reports_link_errors_before_touching_gpu() {
        let Some(gpu) = headless_or_skip() else { return };
        let ctx = gpu.render_ctx(wgpu::TextureFormat::Rgba8Unorm);

        let source = ShaderSource::new(
            PASSTHROUGH_VERTEX,
            "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
        );
        let result = Program::build(&ctx, &source);
        assert!(matches!(result, Err(PipelineError::ShaderLink { .. })));
    }
}
