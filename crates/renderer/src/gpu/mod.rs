//! wgpu backend for the hero.
//!
//! - `context` owns the instance/device/queue and the render target: either a
//!   window surface that is presented every frame, or an offscreen texture.
//! - `pipeline` turns validated GLSL into a render pipeline with one uniform
//!   bind group and the quad's vertex buffer.
//! - `readback` copies the offscreen target back into an `image::RgbaImage`.

mod context;
mod pipeline;
mod readback;

pub use context::{GpuContext, CLEAR_COLOR};
pub use pipeline::GpuProgram;
