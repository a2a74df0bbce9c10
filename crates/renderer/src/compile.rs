//! CPU-side shader front end.
//!
//! Both GLSL stages go through naga's GLSL parser and validator before any
//! GPU object is created, so a broken shader surfaces as a stage-specific
//! diagnostic instead of a device error. Linking checks that every
//! user-defined input the fragment stage reads is written by the vertex stage.

use std::collections::BTreeSet;

use wgpu::naga::front::glsl::{Frontend, Options};
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::{Binding, Module, ShaderStage, TypeInner};

use crate::error::{RendererError, StageKind};
use crate::program::ShaderSources;

/// Entry point every hero stage must define.
pub const ENTRY_POINT: &str = "main";

/// Parsed and validated vertex/fragment modules.
#[derive(Debug)]
pub struct CompiledProgram {
    pub vertex: Module,
    pub fragment: Module,
}

/// Parses and validates a single GLSL 450 stage.
pub fn compile_stage(stage: StageKind, source: &str) -> Result<Module, RendererError> {
    let naga_stage = naga_stage(stage);
    let mut frontend = Frontend::default();
    let module = frontend
        .parse(&Options::from(naga_stage), source)
        .map_err(|errors| RendererError::compile(stage, errors.emit_to_string(source)))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|error| RendererError::compile(stage, error.emit_to_string(source)))?;

    let has_entry = module
        .entry_points
        .iter()
        .any(|entry| entry.stage == naga_stage && entry.name == ENTRY_POINT);
    if !has_entry {
        return Err(RendererError::compile(
            stage,
            format!("missing `{ENTRY_POINT}` entry point"),
        ));
    }

    Ok(module)
}

/// Checks that the fragment stage only reads locations the vertex stage writes.
pub fn link_stages(vertex: &Module, fragment: &Module) -> Result<(), RendererError> {
    let written = vertex
        .entry_points
        .iter()
        .filter(|entry| entry.stage == ShaderStage::Vertex)
        .filter_map(|entry| entry.function.result.as_ref())
        .flat_map(|result| locations(vertex, result.binding.as_ref(), result.ty))
        .collect::<BTreeSet<_>>();

    let read = fragment
        .entry_points
        .iter()
        .filter(|entry| entry.stage == ShaderStage::Fragment)
        .flat_map(|entry| entry.function.arguments.iter())
        .flat_map(|argument| locations(fragment, argument.binding.as_ref(), argument.ty))
        .collect::<BTreeSet<_>>();

    let missing: Vec<u32> = read.difference(&written).copied().collect();
    if missing.is_empty() {
        Ok(())
    } else {
        let list = missing
            .iter()
            .map(|location| location.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(RendererError::Link(format!(
            "fragment stage reads location(s) {list} not written by the vertex stage"
        )))
    }
}

/// Compiles both stages and links them.
pub fn validate_program(sources: ShaderSources<'_>) -> Result<CompiledProgram, RendererError> {
    let vertex = compile_stage(StageKind::Vertex, sources.vertex)?;
    let fragment = compile_stage(StageKind::Fragment, sources.fragment)?;
    link_stages(&vertex, &fragment)?;
    Ok(CompiledProgram { vertex, fragment })
}

pub(crate) fn naga_stage(stage: StageKind) -> ShaderStage {
    match stage {
        StageKind::Vertex => ShaderStage::Vertex,
        StageKind::Fragment => ShaderStage::Fragment,
    }
}

fn locations(
    module: &Module,
    binding: Option<&Binding>,
    ty: wgpu::naga::Handle<wgpu::naga::Type>,
) -> Vec<u32> {
    match binding {
        Some(Binding::Location { location, .. }) => vec![*location],
        Some(Binding::BuiltIn(_)) => Vec::new(),
        None => match &module.types[ty].inner {
            TypeInner::Struct { members, .. } => members
                .iter()
                .filter_map(|member| match member.binding {
                    Some(Binding::Location { location, .. }) => Some(location),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{FRAGMENT_SHADER, VERTEX_SHADER};

    const VARYING_VERTEX: &str = "#version 450
layout(location = 0) in vec2 a_position;
layout(location = 0) out vec2 v_uv;
void main() {
    v_uv = a_position * 0.5 + vec2(0.5);
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

    const VARYING_FRAGMENT: &str = "#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;
void main() {
    outColor = vec4(v_uv, 0.0, 1.0);
}
";

    #[test]
    fn hero_program_validates() {
        let program = validate_program(ShaderSources::hero()).expect("hero shaders compile");
        assert_eq!(program.vertex.entry_points.len(), 1);
        assert_eq!(program.fragment.entry_points.len(), 1);
    }

    #[test]
    fn syntax_error_reports_fragment_stage() {
        let broken = "#version 450\nlayout(location = 0) out vec4 outColor;\nvoid main() { outColor = vec4(1.0 }\n";
        let err = validate_program(ShaderSources::new(VERTEX_SHADER, broken)).unwrap_err();
        match err {
            RendererError::Compile { stage, log } => {
                assert_eq!(stage, StageKind::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn vertex_errors_are_reported_before_fragment() {
        let err = validate_program(ShaderSources::new("#version 450\nvoid main( {", "")).unwrap_err();
        assert!(matches!(
            err,
            RendererError::Compile {
                stage: StageKind::Vertex,
                ..
            }
        ));
    }

    #[test]
    fn unmatched_varying_fails_to_link() {
        let err = validate_program(ShaderSources::new(VERTEX_SHADER, VARYING_FRAGMENT)).unwrap_err();
        match err {
            RendererError::Link(log) => assert!(log.contains('0'), "log: {log}"),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn matched_varying_links() {
        validate_program(ShaderSources::new(VARYING_VERTEX, VARYING_FRAGMENT))
            .expect("matching varyings link");
    }

    #[test]
    fn hero_fragment_reads_no_varyings() {
        let vertex = compile_stage(StageKind::Vertex, VERTEX_SHADER).unwrap();
        let fragment = compile_stage(StageKind::Fragment, FRAGMENT_SHADER).unwrap();
        link_stages(&vertex, &fragment).unwrap();
    }
}
