//! Structural diff: compare two records and produce change operations.
//!
//! Mappings are walked field by field in the second record's order,
//! sequences are compared as sets of structurally distinct elements, and
//! scalars are compared by value. Fields and elements present only in the
//! first record never produce an operation.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use reconcile_types::{contains_equal, FieldPath, Operation, ShapeError, ValueKind};

use crate::error::DiffResult;
use crate::policy::{DiffOptions, FieldPolicy, OTHER_IDENTIFIERS, OTHER_NAMES};

/// The ordered operations that layer one record's information onto another.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    /// Operations in depth-first, field-encounter order.
    pub operations: Vec<Operation>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Number of `Append` operations.
    pub fn appends(&self) -> usize {
        self.operations.iter().filter(|op| op.is_append()).count()
    }

    /// Number of `Replace` operations.
    pub fn replaces(&self) -> usize {
        self.operations.iter().filter(|op| !op.is_append()).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

impl PartialEq<Vec<Operation>> for ChangeSet {
    fn eq(&self, other: &Vec<Operation>) -> bool {
        self.operations == *other
    }
}

impl IntoIterator for ChangeSet {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// Compute the operations needed to layer `b`'s information onto `a`, using
/// the default field policies.
///
/// With `keep_both_ids`, a differing `id` is reported as an `Append` onto
/// `other_identifiers`; otherwise it produces nothing.
pub fn compute_merge(a: &Value, b: &Value, keep_both_ids: bool) -> DiffResult<ChangeSet> {
    compute_merge_with(a, b, &DiffOptions::default().keep_both_ids(keep_both_ids))
}

/// Compute the operations needed to layer `b`'s information onto `a`.
///
/// # Errors
///
/// Returns [`ShapeError::ShapeMismatch`] when the two values hold different
/// kinds (e.g. a mapping and a scalar) at a shared path.
pub fn compute_merge_with(a: &Value, b: &Value, options: &DiffOptions) -> DiffResult<ChangeSet> {
    let mut walker = Walker {
        options,
        operations: Vec::new(),
    };
    walker.compare(&FieldPath::root(), a, b)?;

    let changes = ChangeSet {
        operations: walker.operations,
    };
    debug!(
        appends = changes.appends(),
        replaces = changes.replaces(),
        "computed merge"
    );
    Ok(changes)
}

struct Walker<'o> {
    options: &'o DiffOptions,
    operations: Vec<Operation>,
}

impl Walker<'_> {
    fn compare(&mut self, path: &FieldPath, a: &Value, b: &Value) -> Result<(), ShapeError> {
        match (a, b) {
            _ if a == b => Ok(()),
            (Value::Object(a), Value::Object(b)) => self.compare_mappings(path, a, b),
            (Value::Array(a), Value::Array(b)) => {
                self.compare_sequences(path, a, b);
                Ok(())
            }
            // An unset field takes whatever arrives.
            (Value::Null, _) => {
                self.replace(path, Some(a), b);
                Ok(())
            }
            (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => {
                Err(ShapeError::ShapeMismatch {
                    path: path.clone(),
                    expected: ValueKind::of(a),
                    actual: ValueKind::of(b),
                })
            }
            _ => {
                self.replace(path, Some(a), b);
                Ok(())
            }
        }
    }

    fn compare_mappings(
        &mut self,
        path: &FieldPath,
        a: &Map<String, Value>,
        b: &Map<String, Value>,
    ) -> Result<(), ShapeError> {
        for (field, b_value) in b {
            let child = path.child(field);
            let policy = if path.is_root() {
                self.options.policies.get(field)
            } else {
                None
            };
            if policy == Some(FieldPolicy::Skip) {
                continue;
            }

            let Some(a_value) = a.get(field) else {
                self.replace(&child, None, b_value);
                continue;
            };
            if a_value == b_value {
                continue;
            }
            // An unset field has no history to keep.
            if a_value.is_null() {
                self.replace(&child, Some(a_value), b_value);
                continue;
            }

            match policy {
                Some(FieldPolicy::Identifier) => self.identifier(path, &child, b_value),
                Some(FieldPolicy::NameHistory) => {
                    self.operations.push(Operation::Append {
                        path: path.child(OTHER_NAMES),
                        value: json!({ "name": a_value }),
                    });
                    self.replace(&child, Some(a_value), b_value);
                }
                Some(FieldPolicy::History) => match (a_value, b_value) {
                    (Value::Array(a_items), Value::Array(b_items)) => {
                        self.union(&child, a_items, b_items);
                    }
                    _ => self.compare(&child, a_value, b_value)?,
                },
                Some(FieldPolicy::Skip) | None => self.compare(&child, a_value, b_value)?,
            }
        }
        Ok(())
    }

    fn compare_sequences(&mut self, path: &FieldPath, a: &[Value], b: &[Value]) {
        let records = a.iter().chain(b).all(Value::is_object);
        if records {
            self.union(path, a, b);
        } else if b.iter().any(|item| !contains_equal(a, item)) {
            self.replace(path, Some(&Value::Array(a.to_vec())), &Value::Array(b.to_vec()));
        }
    }

    /// Append every element of `b` that has no structural equal in `a`.
    fn union(&mut self, path: &FieldPath, a: &[Value], b: &[Value]) {
        let mut appended: Vec<Value> = Vec::new();
        for item in b {
            if contains_equal(a, item) || contains_equal(&appended, item) {
                continue;
            }
            appended.push(item.clone());
            self.operations.push(Operation::Append {
                path: path.clone(),
                value: item.clone(),
            });
        }
    }

    fn identifier(&mut self, parent: &FieldPath, path: &FieldPath, incoming: &Value) {
        if !self.options.keep_both_ids {
            debug!(path = %path, "identifier differs; keeping existing");
            return;
        }
        self.operations.push(Operation::Append {
            path: parent.child(OTHER_IDENTIFIERS),
            value: json!({
                "identifier": incoming,
                "scheme": self.options.identifier_scheme,
            }),
        });
    }

    fn replace(&mut self, path: &FieldPath, old: Option<&Value>, new: &Value) {
        self.operations.push(Operation::Replace {
            path: path.clone(),
            old: old.cloned(),
            new: new.clone(),
        });
    }
}
