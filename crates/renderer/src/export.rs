use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::context::HostSurface;
use crate::error::RendererError;
use crate::gpu::GpuContext;
use crate::hero::HeroRenderer;
use crate::types::{GpuOptions, StillConfig, SurfaceMetrics};
use crate::viewport::target_size;

/// Host surface with fixed metrics backed by an offscreen texture.
pub struct OffscreenSurface {
    metrics: SurfaceMetrics,
    gpu: GpuOptions,
}

impl OffscreenSurface {
    pub fn new(metrics: SurfaceMetrics, gpu: GpuOptions) -> Self {
        Self { metrics, gpu }
    }
}

impl HostSurface for OffscreenSurface {
    type Context = GpuContext;

    fn acquire_context(&self) -> Result<GpuContext, RendererError> {
        GpuContext::offscreen(target_size(self.metrics), &self.gpu)
    }

    fn metrics(&self) -> SurfaceMetrics {
        self.metrics
    }
}

/// Renders one frame at `config.time` and writes it to `config.output` as PNG.
pub fn render_still(config: &StillConfig) -> Result<PathBuf> {
    let (width, height) = config.size;
    let metrics = SurfaceMetrics::new(f64::from(width), f64::from(height), config.pixel_ratio);
    let mut renderer = HeroRenderer::initialize(OffscreenSurface::new(metrics, config.gpu))
        .context("failed to set up offscreen hero")?;

    let report = renderer.resize();
    renderer.render_frame(config.time.as_secs_f32());
    let image = renderer
        .context()
        .read_rgba()
        .context("failed to read back still frame")?;

    if let Some(parent) = config.output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    image
        .save_with_format(&config.output, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    tracing::info!(
        path = %config.output.display(),
        size = %report.size,
        time = config.time.as_secs_f32(),
        "still frame written"
    );
    Ok(config.output.clone())
}
