//! Person records as produced by collection and consumed by the merge engine.
//!
//! Collectors fill in a [`PersonRecord`] and convert it with
//! [`PersonRecord::to_value`]. The resulting mapping is the normalized record
//! shape: optional fields that were never set are omitted, and the capitol and
//! district offices are folded into the `note`-keyed `contact_details` list.
//!
//! Records that arrive already as raw mappings (for example, persisted records
//! that still carry `capitol_office` / `district_office` fields) are brought
//! into the same shape with [`normalize_offices`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ShapeError;
use crate::path::FieldPath;
use crate::value::ValueKind;

/// `note` value identifying the capitol office entry.
pub const CAPITOL_OFFICE: &str = "Capitol Office";
/// `note` value identifying the district office entry.
pub const DISTRICT_OFFICE: &str = "District Office";

const CONTACT_DETAILS: &str = "contact_details";
const NOTE: &str = "note";

/// Contact information for one office.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactOffice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
}

impl ContactOffice {
    /// Returns `true` if no field has been set.
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.voice.is_none() && self.fax.is_none()
    }

    /// The office as a `note`-tagged contact entry.
    pub fn to_entry(&self, note: &str) -> Value {
        let mut entry = Map::new();
        entry.insert(NOTE.into(), Value::String(note.into()));
        insert_opt(&mut entry, "address", &self.address);
        insert_opt(&mut entry, "voice", &self.voice);
        insert_opt(&mut entry, "fax", &self.fax);
        Value::Object(entry)
    }
}

/// A URL with an optional human-readable note.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Link {
    fn to_value(&self) -> Value {
        let mut link = Map::new();
        link.insert("url".into(), Value::String(self.url.clone()));
        insert_opt(&mut link, NOTE, &self.note);
        Value::Object(link)
    }
}

/// A freshly collected legislator record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub state: String,
    pub chamber: String,
    pub district: String,
    pub party: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub capitol_office: ContactOffice,
    #[serde(default)]
    pub district_office: ContactOffice,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub sources: Vec<Link>,
    #[serde(default)]
    pub extras: Map<String, Value>,
}

impl PersonRecord {
    /// Create a record with the classification fields every collector knows.
    pub fn new(
        name: impl Into<String>,
        state: impl Into<String>,
        chamber: impl Into<String>,
        district: impl ToString,
        party: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            chamber: chamber.into(),
            district: district.to_string(),
            party: party.into(),
            ..Default::default()
        }
    }

    /// Record a link, optionally annotated.
    pub fn add_link(&mut self, url: impl Into<String>, note: Option<&str>) {
        self.links.push(Link {
            url: url.into(),
            note: note.map(str::to_owned),
        });
    }

    /// Record a source page, optionally annotated.
    pub fn add_source(&mut self, url: impl Into<String>, note: Option<&str>) {
        self.sources.push(Link {
            url: url.into(),
            note: note.map(str::to_owned),
        });
    }

    /// Convert into the normalized record mapping.
    pub fn to_value(&self) -> Value {
        let mut record = Map::new();
        insert_opt(&mut record, "id", &self.id);
        record.insert("name".into(), Value::String(self.name.clone()));
        record.insert("state".into(), Value::String(self.state.clone()));
        record.insert("chamber".into(), Value::String(self.chamber.clone()));
        record.insert("district".into(), Value::String(self.district.clone()));
        record.insert("party".into(), Value::String(self.party.clone()));
        insert_opt(&mut record, "given_name", &self.given_name);
        insert_opt(&mut record, "family_name", &self.family_name);
        insert_opt(&mut record, "image", &self.image);

        let offices: Vec<Value> = [
            (CAPITOL_OFFICE, &self.capitol_office),
            (DISTRICT_OFFICE, &self.district_office),
        ]
        .into_iter()
        .filter(|(_, office)| !office.is_empty())
        .map(|(note, office)| office.to_entry(note))
        .collect();
        if !offices.is_empty() {
            record.insert(CONTACT_DETAILS.into(), Value::Array(offices));
        }

        if !self.links.is_empty() {
            let links = self.links.iter().map(Link::to_value).collect();
            record.insert("links".into(), Value::Array(links));
        }
        if !self.sources.is_empty() {
            let sources = self.sources.iter().map(Link::to_value).collect();
            record.insert("sources".into(), Value::Array(sources));
        }
        if !self.extras.is_empty() {
            record.insert("extras".into(), Value::Object(self.extras.clone()));
        }
        Value::Object(record)
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(key.into(), Value::String(v.clone()));
    }
}

/// Fold `capitol_office` / `district_office` mappings into `contact_details`.
///
/// Each office mapping becomes a `note`-tagged entry. When `contact_details`
/// already has an entry with the same note, the office only fills in the
/// keys that entry lacks. Null or empty offices are dropped.
pub fn normalize_offices(record: &mut Map<String, Value>) -> Result<(), ShapeError> {
    for (field, note) in [
        ("capitol_office", CAPITOL_OFFICE),
        ("district_office", DISTRICT_OFFICE),
    ] {
        let office = match record.shift_remove(field) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(office)) if office.is_empty() => continue,
            Some(Value::Object(office)) => office,
            Some(other) => {
                return Err(ShapeError::ShapeMismatch {
                    path: FieldPath::parse(field),
                    expected: ValueKind::Mapping,
                    actual: ValueKind::of(&other),
                })
            }
        };

        let details = match record
            .entry(CONTACT_DETAILS)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(details) => details,
            other => {
                return Err(ShapeError::ShapeMismatch {
                    path: FieldPath::parse(CONTACT_DETAILS),
                    expected: ValueKind::Sequence,
                    actual: ValueKind::of(other),
                })
            }
        };

        let existing = details
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|entry| entry.get(NOTE).and_then(Value::as_str) == Some(note));
        match existing {
            Some(entry) => {
                for (key, value) in office {
                    entry.entry(key).or_insert(value);
                }
            }
            None => {
                let mut entry = Map::new();
                entry.insert(NOTE.into(), Value::String(note.into()));
                entry.extend(office);
                details.push(Value::Object(entry));
            }
        }
    }
    Ok(())
}
