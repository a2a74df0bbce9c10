use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use winit::dpi::PhysicalSize;

/// Size and density of the host surface as the window system reports it.
///
/// `display_width`/`display_height` are logical units (CSS pixels on the web,
/// logical points on desktops); `device_pixel_ratio` converts them into
/// physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    pub display_width: f64,
    pub display_height: f64,
    pub device_pixel_ratio: f64,
}

impl SurfaceMetrics {
    pub fn new(display_width: f64, display_height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            display_width,
            display_height,
            device_pixel_ratio,
        }
    }

    /// Converts a physical window size back into logical display units.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Self {
            display_width: f64::from(size.width) / scale,
            display_height: f64::from(size.height) / scale,
            device_pixel_ratio: scale,
        }
    }
}

/// Backing-buffer dimensions in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_uniform(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Adapter power preference forwarded to wgpu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    #[default]
    Low,
    High,
}

/// Device and presentation knobs shared by the window and still paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuOptions {
    pub power: GpuPowerPreference,
    /// Present with FIFO when true; prefer immediate/mailbox otherwise.
    pub vsync: bool,
    /// Desired maximum frame latency; clamped to 1-3.
    pub frame_latency: u32,
}

impl Default for GpuOptions {
    fn default() -> Self {
        Self {
            power: GpuPowerPreference::Low,
            vsync: true,
            frame_latency: 2,
        }
    }
}

/// Immutable configuration for the windowed hero.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub title: String,
    /// Initial window size in logical units.
    pub window_size: (u32, u32),
    pub fullscreen: bool,
    pub gpu: GpuOptions,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "VinoCEO".to_string(),
            window_size: (1280, 800),
            fullscreen: false,
            gpu: GpuOptions::default(),
        }
    }
}

/// Request for a single offscreen frame written to disk as PNG.
#[derive(Debug, Clone, PartialEq)]
pub struct StillConfig {
    pub output: PathBuf,
    /// Elapsed time the frame is evaluated at.
    pub time: Duration,
    /// Display size in logical units.
    pub size: (u32, u32),
    pub pixel_ratio: f64,
    pub gpu: GpuOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_converts_to_logical_metrics() {
        let metrics = SurfaceMetrics::from_physical(PhysicalSize::new(3200, 2400), 2.0);
        assert_eq!(metrics, SurfaceMetrics::new(1600.0, 1200.0, 2.0));
    }

    #[test]
    fn invalid_scale_factor_falls_back_to_one() {
        let metrics = SurfaceMetrics::from_physical(PhysicalSize::new(800, 600), 0.0);
        assert_eq!(metrics, SurfaceMetrics::new(800.0, 600.0, 1.0));
    }

    #[test]
    fn pixel_size_formats_as_dimensions() {
        assert_eq!(PixelSize::new(800, 600).to_string(), "800x600");
        assert_eq!(PixelSize::new(800, 600).as_uniform(), [800.0, 600.0]);
        assert!(PixelSize::default().is_empty());
    }
}
