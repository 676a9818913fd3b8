//! Layer change operations onto a record.

use serde_json::{Map, Value};
use tracing::trace;

use reconcile_types::{contains_equal, FieldPath, Operation, ShapeError, ValueKind};

/// Apply `operations` to `target` in order.
///
/// `Replace` sets the value at its path, creating intermediate mappings as
/// needed. `Append` pushes onto the sequence at its path, creating the
/// sequence when the field is unset, and skips values already present.
///
/// # Errors
///
/// Returns a [`ShapeError`] when an intermediate path segment is not a
/// mapping or an `Append` target is not a sequence. Operations before the
/// failing one stay applied.
pub fn apply_operations<'a, I>(target: &mut Value, operations: I) -> Result<(), ShapeError>
where
    I: IntoIterator<Item = &'a Operation>,
{
    for op in operations {
        trace!(%op, "applying");
        match op {
            Operation::Replace { path, new, .. } => {
                let Some((field, parents)) = path.segments().split_last() else {
                    *target = new.clone();
                    continue;
                };
                let parent = mapping_at(target, parents)?;
                parent.insert(field.clone(), new.clone());
            }
            Operation::Append { path, value } => {
                let slot = match path.segments().split_last() {
                    None => &mut *target,
                    Some((field, parents)) => mapping_at(target, parents)?
                        .entry(field.clone())
                        .or_insert(Value::Null),
                };
                if slot.is_null() {
                    *slot = Value::Array(Vec::new());
                }
                match slot {
                    Value::Array(items) => {
                        if !contains_equal(items, value) {
                            items.push(value.clone());
                        }
                    }
                    other => {
                        return Err(ShapeError::ShapeMismatch {
                            path: path.clone(),
                            expected: ValueKind::Sequence,
                            actual: ValueKind::of(other),
                        })
                    }
                }
            }
        }
    }
    Ok(())
}

/// Walk `segments` from `target`, creating missing or unset mappings.
fn mapping_at<'v>(
    target: &'v mut Value,
    segments: &[String],
) -> Result<&'v mut Map<String, Value>, ShapeError> {
    let mut walked = FieldPath::root();
    let mut current = as_mapping(target, &walked)?;
    for segment in segments {
        walked = walked.child(segment);
        let next = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = as_mapping(next, &walked)?;
    }
    Ok(current)
}

fn as_mapping<'v>(
    value: &'v mut Value,
    path: &FieldPath,
) -> Result<&'v mut Map<String, Value>, ShapeError> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ShapeError::NotAMapping {
            path: path.clone(),
            actual: ValueKind::of(other),
        }),
    }
}
