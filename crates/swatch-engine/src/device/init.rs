/// Initialization parameters for the GPU layer.
///
/// Shared by the windowed [`Gpu`](super::Gpu) and the offscreen
/// [`HeadlessGpu`](super::HeadlessGpu). Surface-only fields are ignored
/// by the latter.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is supported everywhere and the demo only redraws on demand.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Adapter selection hint.
    pub power_preference: wgpu::PowerPreference,

    /// Retry with a software adapter when no hardware adapter is found.
    pub allow_fallback_adapter: bool,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::default(),
            allow_fallback_adapter: true,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    pub(crate) fn device_descriptor(&self, label: &'static str) -> wgpu::DeviceDescriptor<'static> {
        wgpu::DeviceDescriptor {
            label: Some(label),
            required_features: self.required_features,
            required_limits: self.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        }
    }
}

/// Requests an adapter, retrying with the fallback adapter if allowed.
pub(crate) async fn request_adapter(
    instance: &wgpu::Instance,
    init: &GpuInit,
    compatible_surface: Option<&wgpu::Surface<'_>>,
) -> anyhow::Result<wgpu::Adapter> {
    let primary = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: init.power_preference,
            compatible_surface,
            force_fallback_adapter: false,
        })
        .await;

    match primary {
        Ok(adapter) => Ok(adapter),
        Err(err) if init.allow_fallback_adapter => {
            log::warn!("no hardware adapter ({err}); trying fallback adapter");
            instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: init.power_preference,
                    compatible_surface,
                    force_fallback_adapter: true,
                })
                .await
                .map_err(|e| anyhow::anyhow!("no GPU adapter available: {e}"))
        }
        Err(err) => Err(anyhow::anyhow!("no GPU adapter available: {err}")),
    }
}
