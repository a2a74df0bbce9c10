//! Fixed geometry and shader sources of the hero.

/// GLSL 450 vertex stage: passes clip-space positions straight through.
pub const VERTEX_SHADER: &str = include_str!("../shaders/hero.vert");

/// GLSL 450 fragment stage: wine flow, bottle silhouette, gold rim light.
pub const FRAGMENT_SHADER: &str = include_str!("../shaders/hero.frag");

/// Two triangles covering clip space, in triangle-list order.
pub const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

pub const QUAD_VERTEX_COUNT: u32 = QUAD_VERTICES.len() as u32;

/// Borrowed vertex/fragment source pair handed to a graphics context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

impl<'a> ShaderSources<'a> {
    pub const fn new(vertex: &'a str, fragment: &'a str) -> Self {
        Self { vertex, fragment }
    }
}

impl ShaderSources<'static> {
    pub const fn hero() -> Self {
        Self::new(VERTEX_SHADER, FRAGMENT_SHADER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space() {
        assert_eq!(QUAD_VERTEX_COUNT, 6);
        for corner in [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]] {
            assert!(QUAD_VERTICES.contains(&corner), "missing corner {corner:?}");
        }
    }

    #[test]
    fn sources_declare_glsl_450() {
        assert!(VERTEX_SHADER.starts_with("#version 450"));
        assert!(FRAGMENT_SHADER.starts_with("#version 450"));
    }
}
