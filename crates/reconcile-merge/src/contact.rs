//! `note`-keyed merge of contact office lists.
//!
//! Two offices of the same kind collected at different times usually carry
//! overlapping but different fields, so entries are matched by their `note`
//! ("Capitol Office", "District Office", ...) and merged key by key rather
//! than compared whole.

use serde_json::{Map, Value};
use tracing::debug;

use reconcile_types::{FieldPath, ShapeError, ValueKind};

use crate::config::{DEFAULT_CONTACT_FIELD, DEFAULT_CONTACT_KEY};
use crate::error::{MergeError, MergeResult};
use crate::MergeOutcome;

/// Outcome of a contact list merge: the full merged list, or `Unchanged`.
pub type ContactMerge = MergeOutcome<Vec<Value>>;

/// Merge two contact office lists matched by their `note` field.
///
/// See [`merge_contact_details_by`].
pub fn merge_contact_details(old: &[Value], new: &[Value]) -> MergeResult<ContactMerge> {
    merge_contact_details_by(old, new, DEFAULT_CONTACT_FIELD, DEFAULT_CONTACT_KEY)
}

/// Merge two contact office lists held under `field` and matched by `key`.
///
/// An entry of `new` is paired with the first unpaired entry of `old` that
/// has the same key value. Paired entries become the union of both entries'
/// fields, with `new` winning on conflicts. Unpaired entries are carried
/// through unchanged: `old`'s entries keep their order and `new`-only entries
/// follow. Entries without the key are keyed by the empty value.
///
/// # Errors
///
/// Returns [`MergeError::ContactEntry`] naming the list and the entry's
/// `field.<index>` path when an entry is not a mapping.
pub fn merge_contact_details_by(
    old: &[Value],
    new: &[Value],
    field: &str,
    key: &str,
) -> MergeResult<ContactMerge> {
    let mut merged: Vec<(String, Map<String, Value>)> = Vec::with_capacity(old.len() + new.len());
    for (index, item) in old.iter().enumerate() {
        let entry = as_entry(item, field, index)
            .map_err(|source| MergeError::ContactEntry { side: "old", source })?;
        merged.push((note_of(entry, key), entry.clone()));
    }

    let mut paired = vec![false; old.len()];
    for (index, item) in new.iter().enumerate() {
        let entry = as_entry(item, field, index)
            .map_err(|source| MergeError::ContactEntry { side: "new", source })?;
        let note = note_of(entry, key);
        let slot = (0..old.len()).find(|&i| !paired[i] && merged[i].0 == note);
        match slot {
            Some(i) => {
                paired[i] = true;
                let target = &mut merged[i].1;
                for (field, value) in entry {
                    target.insert(field.clone(), value.clone());
                }
            }
            None => {
                debug!(note = %note, "new contact entry");
                merged.push((note, entry.clone()));
            }
        }
    }

    let merged: Vec<Value> = merged
        .into_iter()
        .map(|(_, entry)| Value::Object(entry))
        .collect();
    if merged.as_slice() == old {
        Ok(MergeOutcome::Unchanged)
    } else {
        Ok(MergeOutcome::Changed(merged))
    }
}

fn as_entry<'v>(
    item: &'v Value,
    field: &str,
    index: usize,
) -> Result<&'v Map<String, Value>, ShapeError> {
    item.as_object().ok_or_else(|| ShapeError::ShapeMismatch {
        path: FieldPath::parse(field).child(&index.to_string()),
        expected: ValueKind::Mapping,
        actual: ValueKind::of(item),
    })
}

fn note_of(entry: &Map<String, Value>, key: &str) -> String {
    match entry.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(note)) => note.clone(),
        Some(other) => other.to_string(),
    }
}
