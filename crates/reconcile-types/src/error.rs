use thiserror::Error;

use crate::path::FieldPath;
use crate::value::ValueKind;

/// Errors produced when two values disagree in shape at a shared path.
///
/// Inputs are assumed to be well-formed records of the same logical entity;
/// these errors are caller precondition violations, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("shape mismatch at '{path}': expected {expected}, got {actual}")]
    ShapeMismatch {
        path: FieldPath,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("expected a mapping at '{path}', got {actual}")]
    NotAMapping { path: FieldPath, actual: ValueKind },
}

impl ShapeError {
    /// The path at which the violation was detected.
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::ShapeMismatch { path, .. } | Self::NotAMapping { path, .. } => path,
        }
    }
}
