//! Person record merge.
//!
//! The persisted record is the base. The diff engine reports what the
//! incoming record adds or changes under the merge policy, those operations
//! are applied to a copy of the base, and the contact office list is merged
//! separately by `note`. The base's office mappings are only folded into the
//! contact list when the incoming record brings contact data of its own.

use serde_json::{Map, Value};
use tracing::debug;

use reconcile_diff::{apply_operations, compute_merge_with};
use reconcile_types::{normalize_offices, FieldPath, ShapeError, ValueKind};

use crate::config::MergeConfig;
use crate::contact::merge_contact_details_by;
use crate::error::MergeResult;
use crate::MergeOutcome;

/// Outcome of a person merge: the merged record, or `Unchanged`.
pub type PersonMerge = MergeOutcome<Value>;

/// Merge `new` into `old` under the default merge policy.
///
/// `keep_both_ids` overrides the policy's setting when given: if `true`, a
/// differing incoming `id` is recorded under `other_identifiers` while the
/// existing `id` is kept.
pub fn merge_people(old: &Value, new: &Value, keep_both_ids: Option<bool>) -> MergeResult<Value> {
    merge_people_with(old, new, keep_both_ids, &MergeConfig::default())
}

/// Merge `new` into `old` under `config`.
///
/// - Fields only in `old` are retained.
/// - `id` keeps the existing value (see `keep_both_ids`).
/// - A differing `name` is replaced and the old name appended to `other_names`.
/// - History fields are unioned, old elements first.
/// - Nested mappings are merged key by key; keys only in `old` survive.
/// - The contact list is merged by its key field.
/// - Anything else takes the incoming value.
///
/// Office mappings (`capitol_office`, `district_office`) of `new` are folded
/// into its contact list first. Those of `old` are folded only when `new` has
/// a contact list to merge with, otherwise they are retained as they are.
///
/// # Errors
///
/// Returns a shape error when either record is not a mapping or the two
/// records hold different kinds of value at a shared path.
pub fn merge_people_with(
    old: &Value,
    new: &Value,
    keep_both_ids: Option<bool>,
    config: &MergeConfig,
) -> MergeResult<Value> {
    let incoming = normalized(new)?;
    let base = if incoming.contains_key(&config.contact_field) {
        normalized(old)?
    } else {
        as_record(old)?.clone()
    };
    let (base, incoming) = (Value::Object(base), Value::Object(incoming));

    let mut options = config.diff_options();
    if let Some(keep) = keep_both_ids {
        options.keep_both_ids = keep;
    }

    let changes = compute_merge_with(&base, &incoming, &options)?;
    debug!(
        appends = changes.appends(),
        replaces = changes.replaces(),
        "merging person record"
    );
    let mut merged = base.clone();
    apply_operations(&mut merged, &changes)?;

    if let Some(new_contacts) = incoming.get(&config.contact_field) {
        let new_contacts = as_sequence(new_contacts, &config.contact_field)?;
        let old_contacts = match base.get(&config.contact_field) {
            None | Some(Value::Null) => &[][..],
            Some(contacts) => as_sequence(contacts, &config.contact_field)?,
        };
        match merge_contact_details_by(
            old_contacts,
            new_contacts,
            &config.contact_field,
            &config.contact_key,
        )? {
            MergeOutcome::Unchanged => {}
            MergeOutcome::Changed(contacts) => {
                debug!(entries = contacts.len(), "contact details changed");
                if let Value::Object(record) = &mut merged {
                    record.insert(config.contact_field.clone(), Value::Array(contacts));
                }
            }
        }
    }

    Ok(merged)
}

/// Merge `new` into `old`, reporting `Unchanged` when the result equals `old`
/// so the caller can skip persisting it.
pub fn reconcile_people(old: &Value, new: &Value, config: &MergeConfig) -> MergeResult<PersonMerge> {
    let merged = merge_people_with(old, new, None, config)?;
    if merged == *old {
        Ok(MergeOutcome::Unchanged)
    } else {
        Ok(MergeOutcome::Changed(merged))
    }
}

fn as_record(record: &Value) -> Result<&Map<String, Value>, ShapeError> {
    record.as_object().ok_or_else(|| ShapeError::NotAMapping {
        path: FieldPath::root(),
        actual: ValueKind::of(record),
    })
}

fn normalized(record: &Value) -> Result<Map<String, Value>, ShapeError> {
    let mut fields = as_record(record)?.clone();
    normalize_offices(&mut fields)?;
    Ok(fields)
}

fn as_sequence<'v>(value: &'v Value, field: &str) -> Result<&'v [Value], ShapeError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ShapeError::ShapeMismatch {
            path: FieldPath::parse(field),
            expected: ValueKind::Sequence,
            actual: ValueKind::of(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use reconcile_types::PersonRecord;

    fn merge(old: Value, new: Value) -> Value {
        merge_people(&old, &new, None).unwrap()
    }

    // ---- simple fields ----

    #[test]
    fn no_changes() {
        assert_eq!(merge(json!({"name": "Anna"}), json!({"name": "Anna"})), json!({"name": "Anna"}));
    }

    #[test]
    fn field_only_in_old_survives() {
        assert_eq!(
            merge(json!({"name": "Anna", "birth_date": "1980"}), json!({"name": "Anna"})),
            json!({"name": "Anna", "birth_date": "1980"})
        );
    }

    #[test]
    fn field_only_in_new_added() {
        assert_eq!(
            merge(json!({"name": "Anna"}), json!({"name": "Anna", "birth_date": "1980"})),
            json!({"name": "Anna", "birth_date": "1980"})
        );
    }

    #[test]
    fn name_change_recorded() {
        assert_eq!(
            merge(json!({"name": "Bob"}), json!({"name": "Robert"})),
            json!({"name": "Robert", "other_names": [{"name": "Bob"}]})
        );
    }

    #[test]
    fn repeated_name_not_duplicated() {
        assert_eq!(
            merge(
                json!({"name": "Bob", "other_names": [{"name": "Bob"}]}),
                json!({"name": "Robert"})
            ),
            json!({"name": "Robert", "other_names": [{"name": "Bob"}]})
        );
    }

    #[test]
    fn scalar_overwrite() {
        assert_eq!(
            merge(json!({"party": "Independent"}), json!({"party": "Democratic"})),
            json!({"party": "Democratic"})
        );
    }

    // ---- history lists ----

    #[test]
    fn more_in_first_list() {
        assert_eq!(
            merge(
                json!({"other_names": [{"name": "A"}, {"name": "B"}]}),
                json!({"other_names": [{"name": "A"}]})
            ),
            json!({"other_names": [{"name": "A"}, {"name": "B"}]})
        );
    }

    #[test]
    fn more_in_second_list() {
        assert_eq!(
            merge(
                json!({"other_names": [{"name": "A"}]}),
                json!({"other_names": [{"name": "A"}, {"name": "B"}]})
            ),
            json!({"other_names": [{"name": "A"}, {"name": "B"}]})
        );
    }

    #[test]
    fn each_list_unique() {
        assert_eq!(
            merge(
                json!({"other_names": [{"name": "A"}]}),
                json!({"other_names": [{"name": "B"}]})
            ),
            json!({"other_names": [{"name": "A"}, {"name": "B"}]})
        );
    }

    #[test]
    fn union_keeps_old_first() {
        let merged = merge(
            json!({"links": [{"url": "b"}, {"url": "a"}]}),
            json!({"links": [{"url": "c"}, {"url": "a"}]}),
        );
        assert_eq!(merged["links"], json!([{"url": "b"}, {"url": "a"}, {"url": "c"}]));
    }

    // ---- identifiers ----

    #[test]
    fn ids_discarded_by_default() {
        assert_eq!(
            merge(json!({"id": "ocd-person/1"}), json!({"id": "ocd-person/2"})),
            json!({"id": "ocd-person/1"})
        );
    }

    #[test]
    fn keep_both_ids_simplest_case() {
        let merged = merge_people(
            &json!({"id": "ocd-person/1"}),
            &json!({"id": "ocd-person/2"}),
            Some(true),
        )
        .unwrap();
        assert_eq!(
            merged,
            json!({
                "id": "ocd-person/1",
                "other_identifiers": [{"scheme": "openstates", "identifier": "ocd-person/2"}],
            })
        );
    }

    #[test]
    fn keep_both_ids_with_existing_identifiers() {
        let merged = merge_people(
            &json!({
                "id": "ocd-person/1",
                "other_identifiers": [{"scheme": "openstates", "identifier": "ocd-person/0"}],
            }),
            &json!({"id": "ocd-person/2"}),
            Some(true),
        )
        .unwrap();
        assert_eq!(
            merged,
            json!({
                "id": "ocd-person/1",
                "other_identifiers": [
                    {"scheme": "openstates", "identifier": "ocd-person/0"},
                    {"scheme": "openstates", "identifier": "ocd-person/2"},
                ],
            })
        );
    }

    #[test]
    fn keep_both_ids_from_config() {
        let config = MergeConfig {
            keep_both_ids: true,
            ..MergeConfig::default()
        };
        let merged =
            merge_people_with(&json!({"id": "1"}), &json!({"id": "2"}), None, &config).unwrap();
        assert_eq!(merged["other_identifiers"][0]["identifier"], json!("2"));

        let merged =
            merge_people_with(&json!({"id": "1"}), &json!({"id": "2"}), Some(false), &config)
                .unwrap();
        assert_eq!(merged, json!({"id": "1"}));
    }

    // ---- nested mappings ----

    #[test]
    fn extras_added_to_empty_record() {
        let extras = json!({"extras": {"_internal_id": 123}});
        assert_eq!(merge(json!({}), extras.clone()), extras);
    }

    #[test]
    fn extras_sub_keys_survive() {
        assert_eq!(
            merge(
                json!({"extras": {"_internal_id": 123, "hometown": "Tulsa"}}),
                json!({"extras": {"hometown": "Norman"}})
            ),
            json!({"extras": {"_internal_id": 123, "hometown": "Norman"}})
        );
    }

    #[test]
    fn empty_new_keeps_old() {
        let old = json!({"extras": {"_internal_id": 123}});
        assert_eq!(merge(old.clone(), json!({})), old);
    }

    // ---- contact details ----

    #[test]
    fn contact_details_merged_by_note() {
        let merged = merge(
            json!({"contact_details": [{"note": "Capitol Office", "voice": "123"}]}),
            json!({"contact_details": [
                {"note": "Capitol Office", "fax": "456"},
                {"note": "District Office", "address": "abc"},
            ]}),
        );
        assert_eq!(
            merged,
            json!({"contact_details": [
                {"note": "Capitol Office", "voice": "123", "fax": "456"},
                {"note": "District Office", "address": "abc"},
            ]})
        );
    }

    #[test]
    fn contact_details_unchanged_left_alone() {
        let old = json!({"contact_details": [
            {"note": "Capitol Office", "voice": "123"},
            {"note": "District Office", "address": "abc"},
        ]});
        let new = json!({"contact_details": [{"note": "District Office", "address": "abc"}]});
        assert_eq!(merge(old.clone(), new), old);
    }

    #[test]
    fn office_mappings_normalized() {
        let merged = merge(
            json!({"contact_details": [{"note": "Capitol Office", "voice": "123"}]}),
            json!({"capitol_office": {"fax": "456"}}),
        );
        assert_eq!(
            merged,
            json!({"contact_details": [{"note": "Capitol Office", "voice": "123", "fax": "456"}]})
        );
    }

    #[test]
    fn old_offices_kept_without_incoming_contacts() {
        let old = json!({"name": "Anna", "capitol_office": {"voice": "123"}});
        assert_eq!(merge(old.clone(), json!({"name": "Anna"})), old);

        let outcome = reconcile_people(&old, &json!({"name": "Anna"}), &MergeConfig::default()).unwrap();
        assert_eq!(outcome, MergeOutcome::Unchanged);
    }

    #[test]
    fn old_offices_folded_when_incoming_has_contacts() {
        let merged = merge(
            json!({"capitol_office": {"voice": "123"}}),
            json!({"district_office": {"address": "abc"}}),
        );
        assert_eq!(
            merged,
            json!({"contact_details": [
                {"note": "Capitol Office", "voice": "123"},
                {"note": "District Office", "address": "abc"},
            ]})
        );
    }

    // ---- whole records ----

    #[test]
    fn collected_record_absorbed() {
        let old = json!({
            "id": "ocd-person/1",
            "name": "Jane Doe",
            "party": "Republican",
            "contact_details": [{"note": "Capitol Office", "voice": "405-555-0100"}],
            "other_identifiers": [{"scheme": "legacy_openstates", "identifier": "OKL000123"}],
            "extras": {"_internal_id": 7},
        });

        let mut p = PersonRecord::new("Jane Q. Doe", "ok", "lower", 12, "Republican");
        p.capitol_office.address = Some("2300 N Lincoln Blvd; Room 300".into());
        p.add_source("https://www.okhouse.gov/Members/District.aspx?District=12", None);

        let merged = merge(old, p.to_value());
        assert_eq!(merged["id"], json!("ocd-person/1"));
        assert_eq!(merged["name"], json!("Jane Q. Doe"));
        assert_eq!(merged["other_names"], json!([{"name": "Jane Doe"}]));
        assert_eq!(merged["district"], json!("12"));
        assert_eq!(merged["extras"], json!({"_internal_id": 7}));
        assert_eq!(
            merged["contact_details"],
            json!([{
                "note": "Capitol Office",
                "voice": "405-555-0100",
                "address": "2300 N Lincoln Blvd; Room 300",
            }])
        );
        assert_eq!(merged["other_identifiers"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn reconcile_reports_unchanged() {
        let old = json!({
            "name": "Anna",
            "birth_date": "1980",
            "contact_details": [{"note": "Capitol Office", "voice": "123"}],
        });
        let new = json!({"name": "Anna", "contact_details": [{"note": "Capitol Office", "voice": "123"}]});
        let outcome = reconcile_people(&old, &new, &MergeConfig::default()).unwrap();
        assert_eq!(outcome, MergeOutcome::Unchanged);
    }

    #[test]
    fn null_name_not_recorded_in_history() {
        assert_eq!(merge(json!({"name": null}), json!({"name": "A"})), json!({"name": "A"}));
    }

    #[test]
    fn reconcile_reports_changed() {
        let outcome = reconcile_people(
            &json!({"name": "Anna"}),
            &json!({"name": "Anna", "party": "Democratic"}),
            &MergeConfig::default(),
        )
        .unwrap();
        assert_eq!(
            outcome.into_changed(),
            Some(json!({"name": "Anna", "party": "Democratic"}))
        );
    }

    // ---- errors ----

    #[test]
    fn non_mapping_record_rejected() {
        assert!(merge_people(&json!(["not", "a", "record"]), &json!({}), None).is_err());
    }

    #[test]
    fn shape_mismatch_propagates() {
        let err = merge_people(&json!({"extras": {"a": 1}}), &json!({"extras": "x"}), None)
            .unwrap_err();
        assert!(err.to_string().contains("extras"));
    }

    #[test]
    fn contact_details_must_be_a_list() {
        let err = merge_people(&json!({}), &json!({"contact_details": "Room 300"}), None)
            .unwrap_err();
        assert!(err.to_string().contains("contact_details"));
    }
}
