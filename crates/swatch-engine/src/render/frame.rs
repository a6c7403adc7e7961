use bytemuck::{Pod, Zeroable};

use crate::paint::Color;

use super::ctx::{RenderCtx, RenderTarget};
use super::error::FormatMismatch;
use super::link::COLOR_BINDING;
use super::program::{Program, COLOR_UNIFORM_SIZE};
use super::quad::QuadBuffer;

/// Background the color target is cleared to before every draw.
pub const CLEAR_COLOR: Color = Color::BLACK;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ColorUniform {
    rgba: [f32; 4],
}

/// Draws the quad with a linked program and a per-frame color.
///
/// Owns the program, the static vertex buffer and the color uniform buffer.
/// `render` may be called any number of times; the output depends only on
/// the color passed in.
pub struct FrameRenderer {
    program: Program,
    quad: QuadBuffer,
    color_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl FrameRenderer {
    pub fn new(ctx: &RenderCtx<'_>, program: Program) -> Self {
        let quad = QuadBuffer::new(ctx);

        let color_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("swatch color ubo"),
            size: COLOR_UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("swatch color bind group"),
            layout: program.bind_group_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: COLOR_BINDING,
                resource: color_ubo.as_entire_binding(),
            }],
        });

        Self {
            program,
            quad,
            color_ubo,
            bind_group,
        }
    }

    /// Records one frame into `target`: clear to [`CLEAR_COLOR`], then draw
    /// the quad as a 4-vertex triangle strip filled with `color`.
    ///
    /// The uniform write is queued on `ctx.queue` and lands before the
    /// encoder's commands once the caller submits.
    pub fn render(
        &self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        color: Color,
    ) -> Result<(), FormatMismatch> {
        if ctx.target_format != self.program.target_format() {
            return Err(FormatMismatch {
                target: ctx.target_format,
                program: self.program.target_format(),
            });
        }

        let uniform = ColorUniform { rgba: color.to_array() };
        ctx.queue
            .write_buffer(&self.color_ubo, 0, bytemuck::bytes_of(&uniform));

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("swatch frame pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(self.program.pipeline());
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad.slice());
        rpass.draw(0..QuadBuffer::VERTEX_COUNT, 0..1);
        Ok(())
    }
}
