use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structural classification of a [`Value`].
///
/// Records are compared kind by kind: mappings recurse, sequences are
/// compared as sets of elements, and everything else (strings, numbers,
/// booleans, null) is a scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Mapping,
    Sequence,
    Scalar,
}

impl ValueKind {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Mapping,
            Value::Array(_) => Self::Sequence,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Self::Scalar,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapping => write!(f, "mapping"),
            Self::Sequence => write!(f, "sequence"),
            Self::Scalar => write!(f, "scalar"),
        }
    }
}

/// Returns `true` if `items` holds an element structurally equal to `value`.
///
/// Mapping equality ignores field order, so `{a, b}` and `{b, a}` match.
pub fn contains_equal(items: &[Value], value: &Value) -> bool {
    items.iter().any(|item| item == value)
}
