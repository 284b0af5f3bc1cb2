//! Orb viewport - wgpu glue around the ray-trace kernel.
//!
//! Owns the surface and device, the kernel's output texture, the GPU kernel
//! and the presentation pass. Each frame runs the kernel (on the CPU or the
//! GPU) to completion and then draws the finished image on a full-screen
//! quad.

pub mod bindings;
pub mod kernel;
pub mod present;
pub mod target;
pub mod uniform;

use anyhow::Result;
use orb_renderer::{Camera, CameraSettings, SCENE_SPHERE};
use wgpu::{
    CompositeAlphaMode, Device, FilterMode, Instance, Queue, Surface, SurfaceCapabilities,
    SurfaceConfiguration, TextureFormat,
};

pub use kernel::GpuKernel;
pub use present::PresentPass;
pub use target::OutputTexture;

/// Where the kernel runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelBackend {
    /// rayon frame pass, uploaded with `write_texture`
    Cpu,
    /// `raytrace.wgsl` compute pass
    #[default]
    Gpu,
}

/// Viewport configuration.
#[derive(Debug, Clone)]
pub struct ViewportOptions {
    pub backend: KernelBackend,
    /// Filter used by the presentation sampler
    pub filter: FilterMode,
    /// Placement and lens; the resolution follows the window
    pub camera: CameraSettings,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            backend: KernelBackend::Gpu,
            filter: FilterMode::Nearest,
            camera: CameraSettings::default(),
        }
    }
}

/// Clamp a window size so a minimised window still has a valid image.
fn frame_size(width: u32, height: u32) -> (u32, u32) {
    (width.max(1), height.max(1))
}

/// Camera record for a frame of the given size.
pub fn camera_for_size(settings: &CameraSettings, size: (u32, u32)) -> Result<Camera> {
    let camera = settings
        .clone()
        .with_resolution(size.0, size.1)
        .to_camera()?;
    Ok(camera)
}

/// Pick the surface format and alpha mode from the adapter's capabilities.
///
/// Kernel colors are stored linearly in rgba8unorm; a non-sRGB surface shows
/// them unchanged, so one is preferred when offered.
fn surface_format_and_alpha(
    caps: &SurfaceCapabilities,
) -> Result<(TextureFormat, CompositeAlphaMode)> {
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .ok_or_else(|| anyhow::anyhow!("Surface reports no supported formats"))?;
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Surface reports no alpha modes"))?;
    Ok((format, alpha_mode))
}

/// Core renderer managing wgpu state
pub struct Renderer {
    pub surface: Surface<'static>,
    pub device: Device,
    pub queue: Queue,
    pub config: SurfaceConfiguration,
    pub size: (u32, u32),

    options: ViewportOptions,
    camera: Camera,
    output: OutputTexture,
    kernel: GpuKernel,
    present: PresentPass,
}

impl Renderer {
    /// Create a new renderer for the given window
    pub async fn new(
        window: std::sync::Arc<winit::window::Window>,
        options: ViewportOptions,
    ) -> Result<Self> {
        let window_size = window.inner_size();
        let size = frame_size(window_size.width, window_size.height);

        // Create wgpu instance
        let instance = Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        // Create surface
        let surface = instance.create_surface(window.clone())?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        // Request device and queue
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Orb Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let (surface_format, alpha_mode) =
            surface_format_and_alpha(&surface.get_capabilities(&adapter))?;

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.0,
            height: size.1,
            present_mode: wgpu::PresentMode::Fifo, // VSync
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);
        log::info!(
            "Surface {}x{} format {:?}, kernel backend {:?}",
            size.0,
            size.1,
            surface_format,
            options.backend
        );

        let camera = camera_for_size(&options.camera, size)?;
        let output = OutputTexture::new(&device, size);
        let kernel = GpuKernel::new(&device, &camera, &output)?;
        let present = PresentPass::new(&device, surface_format, options.filter, &output)?;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            options,
            camera,
            output,
            kernel,
            present,
        })
    }

    /// Handle window resize
    ///
    /// Reconfigures the surface, replaces the output texture and rebinds both
    /// passes to it. Zero-sized windows are ignored.
    pub fn resize(&mut self, new_size: (u32, u32)) -> Result<()> {
        if new_size.0 == 0 || new_size.1 == 0 {
            return Ok(());
        }

        self.size = new_size;
        self.config.width = new_size.0;
        self.config.height = new_size.1;
        self.surface.configure(&self.device, &self.config);

        self.camera = camera_for_size(&self.options.camera, new_size)?;
        self.output = OutputTexture::new(&self.device, new_size);
        self.kernel.rebind(&self.device, &self.output)?;
        self.present.rebind(&self.device, &self.output)?;

        Ok(())
    }

    /// Run one frame: kernel pass, then presentation pass.
    ///
    /// The CPU pass returns only after every row is written and is uploaded
    /// before the draw is submitted. The GPU pass is recorded ahead of the
    /// draw in the same encoder, and wgpu orders the storage writes before
    /// the sampled reads. Either way the quad never sees a partial frame.
    pub fn render(&mut self) -> Result<()> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        match self.options.backend {
            KernelBackend::Cpu => {
                let image =
                    orb_renderer::render(&self.camera, &SCENE_SPHERE, self.size.0, self.size.1)?;
                self.output.upload(&self.queue, &image)?;
            }
            KernelBackend::Gpu => {
                self.kernel.update_camera(&self.queue, &self.camera);
                self.kernel.dispatch(&mut encoder, self.output.size());
            }
        }

        self.present.draw(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Parse and validate a WGSL source the way wgpu does at module creation.
#[cfg(test)]
pub(crate) fn validated_module(source: &str) -> naga::Module {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{}", e.emit_to_string(source)));
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .unwrap_or_else(|e| panic!("shader failed validation: {:?}", e));
    module
}
