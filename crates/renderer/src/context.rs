use crate::error::RendererError;
use crate::program::ShaderSources;
use crate::types::{PixelSize, SurfaceMetrics};

/// Drawing operations the hero needs from a graphics backend.
///
/// The wgpu backend implements this for real windows and offscreen targets;
/// tests implement it with a recorder.
pub trait GraphicsContext {
    /// Linked program plus whatever per-program GPU state the backend keeps.
    type Program;

    /// Compiles and links both stages. No program exists on failure.
    fn compile_program(&mut self, sources: ShaderSources<'_>)
        -> Result<Self::Program, RendererError>;

    /// Uploads the static quad into the program's vertex buffer.
    fn upload_quad(&mut self, program: &mut Self::Program, vertices: &[[f32; 2]]);

    /// Current backing-buffer size in device pixels.
    fn backing_size(&self) -> PixelSize;

    /// Largest backing buffer this context can allocate for `requested`.
    fn clamp_backing(&self, requested: PixelSize) -> PixelSize {
        requested
    }

    /// Replaces the backing buffer with one of the given size.
    fn reallocate_backing(&mut self, size: PixelSize);

    fn set_viewport(&mut self, size: PixelSize);

    fn set_resolution(&mut self, program: &mut Self::Program, resolution: [f32; 2]);

    fn set_time(&mut self, program: &mut Self::Program, seconds: f32);

    /// Issues one triangle-list draw of `vertex_count` vertices.
    fn draw_triangles(&mut self, program: &Self::Program, vertex_count: u32);
}

/// Host element the hero draws into: a window, an offscreen target, a test double.
pub trait HostSurface {
    type Context: GraphicsContext;

    fn acquire_context(&self) -> Result<Self::Context, RendererError>;

    /// Current display size and density; read on every resize pass.
    fn metrics(&self) -> SurfaceMetrics;
}
