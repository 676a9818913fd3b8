//! Error types for the diff crate.

use reconcile_types::ShapeError;

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The two inputs disagree in shape at a shared path.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
