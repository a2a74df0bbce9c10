use std::fmt;

use thiserror::Error;

/// Pipeline stage a shader diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failures that abort hero setup.
#[derive(Debug, Error)]
pub enum RendererError {
    /// The host surface cannot hand out a GPU drawing context.
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    /// A single stage failed to parse or validate; `log` carries the compiler output.
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: StageKind, log: String },
    /// Both stages compiled but could not be combined into a program.
    #[error("shader program failed to link:\n{0}")]
    Link(String),
}

impl RendererError {
    pub fn compile(stage: StageKind, log: impl Into<String>) -> Self {
        Self::Compile {
            stage,
            log: log.into(),
        }
    }
}
