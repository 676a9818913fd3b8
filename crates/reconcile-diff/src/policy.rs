use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Scheme recorded for identifiers preserved under `other_identifiers`.
pub const DEFAULT_IDENTIFIER_SCHEME: &str = "openstates";

/// Field collecting superseded names.
pub const OTHER_NAMES: &str = "other_names";
/// Field collecting additional identifiers.
pub const OTHER_IDENTIFIERS: &str = "other_identifiers";

// ---------------------------------------------------------------------------
// Field policies
// ---------------------------------------------------------------------------

/// Override strategy for a record-level field, consulted before generic
/// comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    /// The field is never compared.
    Skip,
    /// A differing value is never replaced. With `keep_both_ids`, the
    /// incoming value is recorded under `other_identifiers` instead.
    Identifier,
    /// A differing value is replaced and the superseded one is recorded
    /// under `other_names`.
    NameHistory,
    /// Sequences are unioned element by element, whatever the element kind.
    History,
}

/// Lookup table from field name to [`FieldPolicy`].
///
/// Policies are record-level: they govern fields of the top-level mapping
/// only. The default table covers `id` and `name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPolicies(BTreeMap<String, FieldPolicy>);

impl Default for FieldPolicies {
    fn default() -> Self {
        Self::empty()
            .with("id", FieldPolicy::Identifier)
            .with("name", FieldPolicy::NameHistory)
    }
}

impl FieldPolicies {
    /// A table with no overrides: every field is compared generically.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, field: impl Into<String>, policy: FieldPolicy) -> Self {
        self.set(field, policy);
        self
    }

    /// Assign a policy to a field, replacing any previous one.
    pub fn set(&mut self, field: impl Into<String>, policy: FieldPolicy) {
        self.0.insert(field.into(), policy);
    }

    /// Remove the override for a field.
    pub fn remove(&mut self, field: &str) -> Option<FieldPolicy> {
        self.0.remove(field)
    }

    /// The policy governing `field`, if any.
    pub fn get(&self, field: &str) -> Option<FieldPolicy> {
        self.0.get(field).copied()
    }

    /// Iterate over `(field, policy)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldPolicy)> {
        self.0.iter().map(|(field, policy)| (field.as_str(), *policy))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Settings for a diff run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Record a differing incoming `id` under `other_identifiers`.
    pub keep_both_ids: bool,
    /// Scheme written alongside preserved identifiers.
    pub identifier_scheme: String,
    /// Record-level field overrides.
    pub policies: FieldPolicies,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            keep_both_ids: false,
            identifier_scheme: DEFAULT_IDENTIFIER_SCHEME.into(),
            policies: FieldPolicies::default(),
        }
    }
}

impl DiffOptions {
    /// Set the `keep_both_ids` flag.
    pub fn keep_both_ids(mut self, keep: bool) -> Self {
        self.keep_both_ids = keep;
        self
    }

    /// Replace the policy table.
    pub fn with_policies(mut self, policies: FieldPolicies) -> Self {
        self.policies = policies;
        self
    }
}
