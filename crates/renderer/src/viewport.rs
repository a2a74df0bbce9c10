use crate::types::{PixelSize, SurfaceMetrics};

/// Highest device pixel ratio the hero renders at; denser displays are upscaled.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Clamps the reported device pixel ratio into `1.0..=MAX_PIXEL_RATIO`.
///
/// Missing or nonsensical ratios (zero, negative, NaN) count as 1.
pub fn effective_pixel_ratio(device_pixel_ratio: f64) -> f64 {
    if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
        return 1.0;
    }
    device_pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO)
}

/// Backing-buffer size for the given metrics: `floor(display * ratio)` per axis, at least 1.
pub fn target_size(metrics: SurfaceMetrics) -> PixelSize {
    let ratio = effective_pixel_ratio(metrics.device_pixel_ratio);
    PixelSize::new(
        scale_axis(metrics.display_width, ratio),
        scale_axis(metrics.display_height, ratio),
    )
}

fn scale_axis(extent: f64, ratio: f64) -> u32 {
    let scaled = (extent.max(0.0) * ratio).floor();
    if scaled.is_finite() {
        (scaled as u32).max(1)
    } else {
        1
    }
}
