use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use crossbeam_channel::RecvTimeoutError;
use image::RgbaImage;

use super::context::{GpuContext, RenderTarget};

const READBACK_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(2);

impl GpuContext {
    /// Copies the offscreen target into an RGBA image.
    pub fn read_rgba(&self) -> Result<RgbaImage> {
        let RenderTarget::Offscreen { texture } = &self.target else {
            bail!("pixel readback requires an offscreen target");
        };
        let width = texture.width();
        let height = texture.height();
        let unpadded = width as usize * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
        let padded = unpadded.div_ceil(align) * align;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("hero readback"),
            size: (padded * height as usize) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("hero readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded as u32),
                    rows_per_image: Some(height),
                },
            },
            texture.size(),
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = crossbeam_channel::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        let started = Instant::now();
        let mapped = loop {
            self.device
                .poll(wgpu::PollType::Poll)
                .context("failed to poll GPU device")?;
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(result) => break result,
                Err(RecvTimeoutError::Timeout) if started.elapsed() < READBACK_TIMEOUT => continue,
                Err(RecvTimeoutError::Timeout) => bail!("timed out waiting for GPU readback"),
                Err(RecvTimeoutError::Disconnected) => {
                    bail!("readback callback dropped before completing")
                }
            }
        };
        mapped.map_err(|err| anyhow!("failed to map readback buffer: {err}"))?;

        let mut pixels = Vec::with_capacity(unpadded * height as usize);
        {
            let view = slice.get_mapped_range();
            for row in view.chunks(padded) {
                pixels.extend_from_slice(&row[..unpadded]);
            }
        }
        buffer.unmap();

        RgbaImage::from_raw(width, height, pixels)
            .context("readback produced a buffer of unexpected size")
    }
}
