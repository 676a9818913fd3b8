use thiserror::Error;

use reconcile_diff::DiffError;
use reconcile_types::ShapeError;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("{side} contact list: {source}")]
    ContactEntry {
        side: &'static str,
        #[source]
        source: ShapeError,
    },

    #[error("invalid merge configuration: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MergeResult<T> = Result<T, MergeError>;
