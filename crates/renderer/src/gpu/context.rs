use std::sync::Arc;

use winit::window::Window;

use crate::context::GraphicsContext;
use crate::error::RendererError;
use crate::program::ShaderSources;
use crate::types::{GpuOptions, GpuPowerPreference, PixelSize};

use super::pipeline::{self, GpuProgram};

/// Background behind the hero: `#0b0b0b`, opaque.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 11.0 / 255.0,
    g: 11.0 / 255.0,
    b: 11.0 / 255.0,
    a: 1.0,
};

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub(super) enum RenderTarget {
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
    },
}

/// wgpu device plus the target the hero draws into.
pub struct GpuContext {
    _instance: wgpu::Instance,
    pub(super) device: wgpu::Device,
    pub(super) queue: wgpu::Queue,
    pub(super) target: RenderTarget,
    format: wgpu::TextureFormat,
    size: PixelSize,
    viewport: PixelSize,
    max_dimension: u32,
}

impl GpuContext {
    /// Creates a context presenting into `window`.
    pub fn for_window(
        window: Arc<Window>,
        size: PixelSize,
        options: &GpuOptions,
    ) -> Result<Self, RendererError> {
        let instance = new_instance();
        let surface = instance
            .create_surface(window)
            .map_err(|err| unavailable("failed to create rendering surface", err))?;
        let (adapter, device, queue) = request_device(&instance, Some(&surface), options)?;

        let caps = surface.get_capabilities(&adapter);
        let Some(&first_format) = caps.formats.first() else {
            return Err(RendererError::ContextUnavailable(
                "surface reports no supported formats".to_string(),
            ));
        };
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .unwrap_or_else(|| {
                tracing::warn!(
                    fallback = ?first_format,
                    "no non-sRGB surface format available; colours will be gamma-shifted"
                );
                first_format
            });

        let present_mode = select_present_mode(&caps.present_modes, options.vsync);
        let frame_latency = options.frame_latency.clamp(1, 3);
        if frame_latency != options.frame_latency {
            tracing::warn!(
                requested = options.frame_latency,
                clamped = frame_latency,
                "GPU frame latency clamped to valid range (1-3)"
            );
        }
        tracing::debug!(?format, ?present_mode, frame_latency, "configuring surface");

        let max_dimension = device.limits().max_texture_dimension_2d;
        let size = clamp_initial_size(size, max_dimension);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: frame_latency,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            device,
            queue,
            target: RenderTarget::Surface { surface, config },
            format,
            size,
            viewport: size,
            max_dimension,
        })
    }

    /// Creates a headless context rendering into an RGBA texture.
    pub fn offscreen(size: PixelSize, options: &GpuOptions) -> Result<Self, RendererError> {
        let instance = new_instance();
        let (_adapter, device, queue) = request_device(&instance, None, options)?;
        let max_dimension = device.limits().max_texture_dimension_2d;
        let size = clamp_initial_size(size, max_dimension);
        let texture = create_offscreen_texture(&device, size);
        Ok(Self {
            _instance: instance,
            device,
            queue,
            target: RenderTarget::Offscreen { texture },
            format: OFFSCREEN_FORMAT,
            size,
            viewport: size,
            max_dimension,
        })
    }

    fn reconfigure(&mut self) {
        if let RenderTarget::Surface { surface, config } = &mut self.target {
            config.width = self.size.width;
            config.height = self.size.height;
            surface.configure(&self.device, config);
        }
    }

    fn encode_pass(&self, view: &wgpu::TextureView, program: &GpuProgram, vertex_count: u32) {
        self.queue
            .write_buffer(&program.uniform_buffer, 0, bytemuck::bytes_of(&program.uniforms));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("hero encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("hero pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            let width = self.viewport.width.min(self.size.width);
            let height = self.viewport.height.min(self.size.height);
            pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &program.bind_group, &[]);
            if let Some(vertices) = &program.vertex_buffer {
                pass.set_vertex_buffer(0, vertices.slice(..));
                pass.draw(0..vertex_count, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
    }
}

impl GraphicsContext for GpuContext {
    type Program = GpuProgram;

    fn compile_program(
        &mut self,
        sources: ShaderSources<'_>,
    ) -> Result<Self::Program, RendererError> {
        pipeline::build(&self.device, self.format, sources)
    }

    fn upload_quad(&mut self, program: &mut Self::Program, vertices: &[[f32; 2]]) {
        program.upload_vertices(&self.device, vertices);
    }

    fn backing_size(&self) -> PixelSize {
        self.size
    }

    fn clamp_backing(&self, requested: PixelSize) -> PixelSize {
        clamp_size(requested, self.max_dimension)
    }

    fn reallocate_backing(&mut self, size: PixelSize) {
        let size = clamp_size(size, self.max_dimension);
        if size == self.size {
            return;
        }
        self.size = size;
        if let RenderTarget::Offscreen { texture } = &mut self.target {
            *texture = create_offscreen_texture(&self.device, size);
        } else {
            self.reconfigure();
        }
    }

    fn set_viewport(&mut self, size: PixelSize) {
        self.viewport = size;
    }

    fn set_resolution(&mut self, program: &mut Self::Program, resolution: [f32; 2]) {
        program.uniforms.set_resolution(resolution);
    }

    fn set_time(&mut self, program: &mut Self::Program, seconds: f32) {
        program.uniforms.set_time(seconds);
    }

    fn draw_triangles(&mut self, program: &Self::Program, vertex_count: u32) {
        match &self.target {
            RenderTarget::Offscreen { texture } => {
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                self.encode_pass(&view, program, vertex_count);
            }
            RenderTarget::Surface { surface, .. } => match surface.get_current_texture() {
                Ok(frame) => {
                    let view = frame
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());
                    self.encode_pass(&view, program, vertex_count);
                    frame.present();
                }
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    tracing::debug!(size = %self.size, "surface lost or outdated; reconfiguring");
                    self.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("surface out of memory; skipping frame");
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    tracing::debug!("surface timeout; retrying next frame");
                }
                Err(other) => {
                    tracing::warn!(error = ?other, "surface error; retrying next frame");
                }
            },
        }
    }
}

fn new_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        flags: wgpu::InstanceFlags::default(),
        memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
        backend_options: wgpu::BackendOptions::default(),
    })
}

fn request_device(
    instance: &wgpu::Instance,
    compatible_surface: Option<&wgpu::Surface<'_>>,
    options: &GpuOptions,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), RendererError> {
    let power_preference = match options.power {
        GpuPowerPreference::Low => wgpu::PowerPreference::LowPower,
        GpuPowerPreference::High => wgpu::PowerPreference::HighPerformance,
    };
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference,
        compatible_surface,
        force_fallback_adapter: false,
    }))
    .map_err(|err| unavailable("failed to find a suitable GPU adapter", err))?;

    let info = adapter.get_info();
    tracing::debug!(
        name = %info.name,
        backend = ?info.backend,
        device_type = ?info.device_type,
        "selected GPU adapter"
    );

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("vinohero device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
        memory_hints: wgpu::MemoryHints::MemoryUsage,
        trace: wgpu::Trace::default(),
    }))
    .map_err(|err| unavailable("failed to create GPU device", err))?;

    Ok((adapter, device, queue))
}

fn create_offscreen_texture(device: &wgpu::Device, size: PixelSize) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("hero offscreen target"),
        size: wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: OFFSCREEN_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

fn select_present_mode(modes: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    let has = |mode: wgpu::PresentMode| modes.contains(&mode);
    if !vsync {
        if has(wgpu::PresentMode::Immediate) {
            return wgpu::PresentMode::Immediate;
        }
        if has(wgpu::PresentMode::Mailbox) {
            return wgpu::PresentMode::Mailbox;
        }
    }
    if has(wgpu::PresentMode::Fifo) || modes.is_empty() {
        wgpu::PresentMode::Fifo
    } else {
        modes[0]
    }
}

fn clamp_size(size: PixelSize, max_dimension: u32) -> PixelSize {
    PixelSize::new(
        size.width.clamp(1, max_dimension.max(1)),
        size.height.clamp(1, max_dimension.max(1)),
    )
}

fn clamp_initial_size(size: PixelSize, max_dimension: u32) -> PixelSize {
    let clamped = clamp_size(size, max_dimension);
    if clamped != size {
        tracing::warn!(
            requested = %size,
            clamped = %clamped,
            max_dimension,
            "backing buffer exceeds GPU texture limits"
        );
    }
    clamped
}

fn unavailable(what: &str, err: impl std::fmt::Display) -> RendererError {
    RendererError::ContextUnavailable(format!("{what}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_prefers_fifo() {
        let modes = [wgpu::PresentMode::Immediate, wgpu::PresentMode::Fifo];
        assert_eq!(select_present_mode(&modes, true), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn no_vsync_prefers_immediate_then_mailbox() {
        let all = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
        ];
        assert_eq!(select_present_mode(&all, false), wgpu::PresentMode::Immediate);
        let mailbox = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox];
        assert_eq!(select_present_mode(&mailbox, false), wgpu::PresentMode::Mailbox);
        let fifo = [wgpu::PresentMode::Fifo];
        assert_eq!(select_present_mode(&fifo, false), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn oversized_targets_are_clamped() {
        assert_eq!(
            clamp_size(PixelSize::new(9000, 100), 8192),
            PixelSize::new(8192, 100)
        );
        assert_eq!(clamp_size(PixelSize::new(0, 0), 8192), PixelSize::new(1, 1));
    }

    #[test]
    fn clear_colour_is_near_black() {
        assert!((CLEAR_COLOR.r - 0.043).abs() < 0.001);
        assert_eq!(CLEAR_COLOR.a, 1.0);
    }
}
