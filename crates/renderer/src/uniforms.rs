use bytemuck::{Pod, Zeroable};

/// CPU mirror of the fragment stage's `HeroParams` block (std140, 16 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct HeroUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub _padding: f32,
}

impl HeroUniforms {
    pub fn new(resolution: [f32; 2]) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    pub fn set_resolution(&mut self, resolution: [f32; 2]) {
        self.resolution = resolution;
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_matches_std140_layout() {
        assert_eq!(std::mem::size_of::<HeroUniforms>(), 16);
        assert_eq!(std::mem::offset_of!(HeroUniforms, time), 8);
    }

    #[test]
    fn bytes_follow_field_order() {
        let mut uniforms = HeroUniforms::new([800.0, 600.0]);
        uniforms.set_time(1.5);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&uniforms));
        assert_eq!(floats, &[800.0, 600.0, 1.5, 0.0]);
    }
}
