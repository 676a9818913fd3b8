use std::path::Path;

use serde::{Deserialize, Serialize};

use reconcile_diff::{DiffOptions, FieldPolicies, FieldPolicy, DEFAULT_IDENTIFIER_SCHEME};

use crate::error::{MergeError, MergeResult};

/// Default field holding the contact office list.
pub const DEFAULT_CONTACT_FIELD: &str = "contact_details";
/// Default field identifying an office within the contact list.
pub const DEFAULT_CONTACT_KEY: &str = "note";

/// Policy settings for person merges.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Record a differing incoming `id` under `other_identifiers`.
    pub keep_both_ids: bool,
    /// Scheme written alongside preserved identifiers.
    pub identifier_scheme: String,
    /// Sequence fields merged by set union, old elements first.
    pub history_fields: Vec<String>,
    /// Field holding the contact office list.
    pub contact_field: String,
    /// Field of each contact entry used to match offices.
    pub contact_key: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            keep_both_ids: false,
            identifier_scheme: DEFAULT_IDENTIFIER_SCHEME.into(),
            history_fields: ["other_names", "other_identifiers", "links", "sources"]
                .into_iter()
                .map(String::from)
                .collect(),
            contact_field: DEFAULT_CONTACT_FIELD.into(),
            contact_key: DEFAULT_CONTACT_KEY.into(),
        }
    }
}

impl MergeConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> MergeResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| MergeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> MergeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> MergeResult<()> {
        if self.contact_field.is_empty() {
            return Err(MergeError::Config("contact_field must not be empty".into()));
        }
        if self.contact_key.is_empty() {
            return Err(MergeError::Config("contact_key must not be empty".into()));
        }
        if self.history_fields.iter().any(|f| *f == self.contact_field) {
            return Err(MergeError::Config(format!(
                "'{}' cannot be both the contact field and a history field",
                self.contact_field
            )));
        }
        Ok(())
    }

    /// Diff engine settings implementing this policy.
    ///
    /// History fields are unioned and the contact field is left to the
    /// contact merger.
    pub fn diff_options(&self) -> DiffOptions {
        let mut policies = FieldPolicies::default();
        for field in &self.history_fields {
            policies.set(field.as_str(), FieldPolicy::History);
        }
        policies.set(self.contact_field.as_str(), FieldPolicy::Skip);

        DiffOptions {
            keep_both_ids: self.keep_both_ids,
            identifier_scheme: self.identifier_scheme.clone(),
            policies,
        }
    }
}
