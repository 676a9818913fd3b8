use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::FieldPath;

/// A single change needed to layer new information onto an existing record.
///
/// There is no deletion variant: data present only in the existing record
/// is never reported or removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// `value` should be added to the sequence at `path`.
    Append { path: FieldPath, value: Value },
    /// The value at `path` changes from `old` (absent when `None`) to `new`.
    Replace {
        path: FieldPath,
        old: Option<Value>,
        new: Value,
    },
}

impl Operation {
    /// Build an `Append` operation.
    pub fn append(path: impl Into<FieldPath>, value: Value) -> Self {
        Self::Append {
            path: path.into(),
            value,
        }
    }

    /// Build a `Replace` operation.
    pub fn replace(path: impl Into<FieldPath>, old: Option<Value>, new: Value) -> Self {
        Self::Replace {
            path: path.into(),
            old,
            new,
        }
    }

    /// The path this operation targets.
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Append { path, .. } | Self::Replace { path, .. } => path,
        }
    }

    /// Returns `true` for `Append`.
    pub fn is_append(&self) -> bool {
        matches!(self, Self::Append { .. })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append { path, value } => write!(f, "append {path} += {value}"),
            Self::Replace {
                path,
                old: Some(old),
                new,
            } => write!(f, "replace {path}: {old} -> {new}"),
            Self::Replace {
                path,
                old: None,
                new,
            } => write!(f, "replace {path}: (unset) -> {new}"),
        }
    }
}
