//! Renderer crate for the VinoCEO hero.
//!
//! A full-viewport quad is drawn every display refresh with a fragment shader
//! that paints flowing wine behind a bottle silhouette. The flow is:
//!
//! ```text
//!   HostSurface ──acquire_context──▶ GraphicsContext
//!        │                                │ compile_program / upload_quad
//!        ▼                                ▼
//!   Mount::attach ──▶ HeroRenderer ──▶ RepeatingTask (scheduler)
//!                          │ on_refresh: resize() then render_frame(t)
//!                          ▼
//!                    set_viewport / set_resolution / set_time / draw
//! ```
//!
//! `gpu` implements the context on wgpu, `window` hosts it in a winit window
//! and `export` renders single frames offscreen to PNG.

mod compile;
mod context;
mod error;
mod export;
mod gpu;
mod hero;
mod mount;
mod program;
mod types;
mod uniforms;
mod viewport;
mod window;

pub use compile::{compile_stage, link_stages, validate_program, CompiledProgram, ENTRY_POINT};
pub use context::{GraphicsContext, HostSurface};
pub use error::{RendererError, StageKind};
pub use export::{render_still, OffscreenSurface};
pub use gpu::{GpuContext, GpuProgram, CLEAR_COLOR};
pub use hero::{compile_program, HeroRenderer, ResizeReport};
pub use mount::Mount;
pub use program::{
    ShaderSources, FRAGMENT_SHADER, QUAD_VERTEX_COUNT, QUAD_VERTICES, VERTEX_SHADER,
};
pub use types::{
    GpuOptions, GpuPowerPreference, PixelSize, RendererConfig, StillConfig, SurfaceMetrics,
};
pub use uniforms::HeroUniforms;
pub use viewport::{effective_pixel_ratio, target_size, MAX_PIXEL_RATIO};
pub use window::{run_window, RedrawRefresh, WindowSurface};

pub use scheduler;
