use std::fmt;

use thiserror::Error;

/// A syntax error in generated source, with a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.message, self.line, self.column)
    }
}

impl std::error::Error for CompileError {}

/// Why a preview run produced no component.
///
/// Every failure of the normalize → compile → render pipeline lands here;
/// nothing propagates past the preview host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("Paste generated code first.")]
    EmptySource,

    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("No valid React component found.")]
    NotAComponent { name: String },

    #[error("{0}")]
    Render(String),
}

impl PreviewError {
    /// Short machine-readable class name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptySource => "empty",
            Self::Compile(_) => "compile",
            Self::NotAComponent { .. } => "not_a_component",
            Self::Render(_) => "render",
        }
    }
}
