use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::ctx::RenderCtx;
use super::offscreen::map_read;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2], // NDC
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// The rectangle, in triangle-strip order: top-left, top-right,
/// bottom-left, bottom-right.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [-0.7, 0.5] },
    QuadVertex { position: [0.7, 0.5] },
    QuadVertex { position: [-0.7, -0.5] },
    QuadVertex { position: [0.7, -0.5] },
];

/// Immutable GPU vertex buffer holding [`QUAD_VERTICES`].
///
/// Created once; nothing writes to it afterwards.
pub struct QuadBuffer {
    vbo: wgpu::Buffer,
}

impl QuadBuffer {
    pub const VERTEX_COUNT: u32 = QUAD_VERTICES.len() as u32;

    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("swatch quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            // COPY_SRC for read_back.
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
        });
        Self { vbo }
    }

    /// Size of the buffer in bytes.
    pub fn size(&self) -> u64 {
        self.vbo.size()
    }

    pub(crate) fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.vbo.slice(..)
    }

    /// Copies the buffer back from the GPU and decodes it as vertices.
    ///
    /// Blocks until the copy completes.
    pub fn read_back(&self, ctx: &RenderCtx<'_>) -> Result<Vec<QuadVertex>> {
        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("swatch quad readback"),
            size: self.size(),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("swatch quad readback encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.vbo, 0, &staging, 0, self.size());
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let bytes = map_read(ctx.device, &staging)?;
        Ok(bytes
            .chunks_exact(std::mem::size_of::<QuadVertex>())
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::testing::headless_or_skip;

    const EXPECTED: [f32; 8] = [-0.7, 0.5, 0.7, 0.5, -0.7, -0.5, 0.7, -0.5];

    #[test]
    fn vertices_are_the_literal_rectangle() {
        let floats: &[f32] = bytemuck::cast_slice(&QUAD_VERTICES);
        assert_eq!(floats, &EXPECTED);
    }

    #[test]
    fn vertex_stride_is_two_floats() {
        let layout = QuadVertex::layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x2);
    }

    #[test]
    fn strip_order_covers_rectangle() {
        // Strip triangles (0,1,2) and (1,2,3) share the diagonal 1-2.
        let [tl, tr, bl, br] = QUAD_VERTICES.map(|v| v.position);
        assert_eq!(tl[1], tr[1]);
        assert_eq!(bl[1], br[1]);
        assert_eq!(tl[0], bl[0]);
        assert_eq!(tr[0], br[0]);
    }

    #[test]
    fn gpu_buffer_round_trips() {
        let Some(gpu) = headless_or_skip() else { return };
        let ctx = gpu.render_ctx(wgpu::TextureFormat::Rgba8Unorm);

        let quad = QuadBuffer::new(&ctx);
        assert_eq!(quad.size(), 32);

        let vertices = quad.read_back(&ctx).unwrap();
        assert_eq!(vertices, QUAD_VERTICES.to_vec());
    }
}
