use std::path::Path;
use std::sync::mpsc::{self, TryRecvError};
use std::time::Duration;

use anyhow::{Context, Result};

use super::ctx::{RenderCtx, RenderTarget};

/// How long a readback may wait for the GPU before giving up.
const MAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Color texture that can be rendered into without a window and read back.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    /// Texel format of every offscreen target.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Zero sizes are clamped to 1. Sizes above the device's 2D texture limit
    /// are rejected.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        let width = width.max(1);
        let height = height.max(1);

        let max = device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            anyhow::bail!("offscreen target {width}x{height} exceeds the device limit of {max}x{max}");
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("swatch offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            width,
            height,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        Self::FORMAT
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Records `draw` into a fresh encoder targeting this texture and submits it.
    pub fn render_with<F>(&self, ctx: &RenderCtx<'_>, draw: F)
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("swatch offscreen encoder"),
            });

        {
            let mut target = RenderTarget::new(&mut encoder, &self.view);
            draw(ctx, &mut target);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Copies the texture into host memory. Blocks until the copy completes.
    pub fn read_pixels(&self, ctx: &RenderCtx<'_>) -> Result<Framebuffer> {
        let unpadded_row = self.width * 4;
        let padded_row = unpadded_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("swatch offscreen readback"),
            size: padded_row as u64 * self.height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("swatch offscreen readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let padded = map_read(ctx.device, &staging)?;

        let mut pixels = Vec::with_capacity((unpadded_row * self.height) as usize);
        for row in padded.chunks_exact(padded_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_row as usize]);
        }

        Ok(Framebuffer {
            width: self.width,
            height: self.height,
            pixels,
        })
    }
}

/// Maps a `MAP_READ` buffer and copies its contents out.
///
/// Blocks on the device until all submitted work is done, or `MAP_TIMEOUT`
/// elapses.
pub(crate) fn map_read(device: &wgpu::Device, buffer: &wgpu::Buffer) -> Result<Vec<u8>> {
    let slice = buffer.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });

    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(MAP_TIMEOUT),
        })
        .context("device poll failed during readback")?;

    let status = match rx.try_recv() {
        Ok(res) => res,
        Err(TryRecvError::Empty) => anyhow::bail!("buffer mapping did not complete"),
        Err(TryRecvError::Disconnected) => anyhow::bail!("buffer mapping callback was dropped"),
    };
    status.context("failed to map readback buffer")?;

    let bytes = {
        let view = slice.get_mapped_range();
        view.to_vec()
    };
    buffer.unmap();
    Ok(bytes)
}

/// Tightly packed RGBA8 pixels read back from an [`OffscreenTarget`].
///
/// Row 0 is the top of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, clamped to the image bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Pixel under a normalized-device-coordinate point (`+y` up).
    pub fn sample_ndc(&self, x: f32, y: f32) -> [u8; 4] {
        let px = ((x + 1.0) * 0.5 * self.width as f32).floor().max(0.0) as u32;
        let py = ((1.0 - y) * 0.5 * self.height as f32).floor().max(0.0) as u32;
        self.pixel(px, py)
    }

    /// Number of pixels exactly equal to `rgba`.
    pub fn count(&self, rgba: [u8; 4]) -> usize {
        self.pixels.chunks_exact(4).filter(|p| *p == rgba).count()
    }

    /// Writes the image as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let image = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .context("framebuffer size does not match pixel data")?;
        image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Framebuffer {
        // 2x2: red, green / blue, black
        Framebuffer {
            width: 2,
            height: 2,
            pixels: vec![
                255, 0, 0, 255, 0, 255, 0, 255, //
                0, 0, 255, 255, 0, 0, 0, 255,
            ],
        }
    }

    #[test]
    fn pixel_addressing_is_row_major_top_down() {
        let fb = checker();
        assert_eq!(fb.pixel(1, 0), [0, 255, 0, 255]);
        assert_eq!(fb.pixel(0, 1), [0, 0, 255, 255]);
        assert_eq!(fb.pixel(9, 9), [0, 0, 0, 255]);
    }

    #[test]
    fn ndc_sampling_has_y_up() {
        let fb = checker();
        assert_eq!(fb.sample_ndc(-0.5, 0.5), [255, 0, 0, 255]);
        assert_eq!(fb.sample_ndc(-0.5, -0.5), [0, 0, 255, 255]);
        assert_eq!(fb.sample_ndc(1.0, -1.0), [0, 0, 0, 255]);
    }

    #[test]
    fn count_matches_exact_pixels() {
        assert_eq!(checker().count([0, 0, 0, 255]), 1);
        assert_eq!(checker().count([1, 2, 3, 4]), 0);
    }

    #[test]
    fn target_larger_than_device_limit_is_rejected() {
        let Some(gpu) = crate::device::testing::headless_or_skip() else { return };
        let max = gpu.device().limits().max_texture_dimension_2d;

        let err = OffscreenTarget::new(gpu.device(), max + 1, 4).err().unwrap();
        assert!(err.to_string().contains("exceeds the device limit"), "{err}");

        let target = OffscreenTarget::new(gpu.device(), 0, 3).unwrap();
        assert_eq!((target.width(), target.height()), (1, 3));
    }

    #[test]
    fn png_round_trip() {
        let dir = std::env::temp_dir().join(format!("swatch-fb-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("checker.png");

        checker().save_png(&path).unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), checker().as_bytes());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
