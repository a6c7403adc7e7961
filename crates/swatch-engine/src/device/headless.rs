use anyhow::{Context, Result};

use crate::render::RenderCtx;

use super::gpu::log_adapter;
use super::init::request_adapter;
use super::GpuInit;

/// GPU context without a window.
///
/// Used for offscreen snapshots and tests. Rendering goes to an
/// [`OffscreenTarget`](crate::render::OffscreenTarget) instead of a surface.
pub struct HeadlessGpu {
    _instance: wgpu::Instance,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl HeadlessGpu {
    pub async fn new(init: &GpuInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = request_adapter(&instance, init, None).await?;
        log_adapter(&adapter);

        let (device, queue) = adapter
            .request_device(&init.device_descriptor("swatch headless device"))
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Self {
            _instance: instance,
            device,
            queue,
        })
    }

    /// Blocking wrapper around [`HeadlessGpu::new`].
    pub fn new_blocking(init: &GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Render context for targets of `format`.
    pub fn render_ctx(&self, format: wgpu::TextureFormat) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, format)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Headless GPU for tests, or `None` (with a note on stderr) when the
    /// machine has no usable adapter.
    pub(crate) fn headless_or_skip() -> Option<HeadlessGpu> {
        match HeadlessGpu::new_blocking(&GpuInit::default()) {
            Ok(gpu) => Some(gpu),
            Err(err) => {
                eprintln!("skipping GPU test: {err:#}");
                None
            }
        }
    }
}
