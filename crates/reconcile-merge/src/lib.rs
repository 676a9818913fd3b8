//! Merge engine for record reconciliation.
//!
//! Absorbs a freshly collected record into a persisted one. The persisted
//! record is the base: fields it alone carries survive, generic fields take
//! the incoming value, history lists are unioned, and contact offices are
//! matched by their `note` and merged field by field.
//!
//! # Key Types
//!
//! - [`merge_people`] / [`reconcile_people`] -- Person record merge
//! - [`merge_contact_details`] / [`ContactMerge`] -- `note`-keyed contact list merge
//! - [`MergeConfig`] -- Merge policy settings, loadable from TOML
//! - [`MergeOutcome`] -- `Unchanged` / `Changed` result for cheap write skipping

pub mod config;
pub mod contact;
pub mod error;
pub mod person;

pub use config::MergeConfig;
pub use contact::{merge_contact_details, merge_contact_details_by, ContactMerge};
pub use error::{MergeError, MergeResult};
pub use person::{merge_people, merge_people_with, reconcile_people, PersonMerge};

/// Result of a merge that may leave its base untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome<T> {
    /// The merged result equals the existing value; nothing to persist.
    Unchanged,
    /// The fully materialized merged value.
    Changed(T),
}

impl<T> MergeOutcome<T> {
    /// Returns `true` for `Changed`.
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// The merged value, if anything changed.
    pub fn into_changed(self) -> Option<T> {
        match self {
            Self::Changed(value) => Some(value),
            Self::Unchanged => None,
        }
    }

    /// The merged value, falling back to `base` when unchanged.
    pub fn unwrap_or(self, base: T) -> T {
        self.into_changed().unwrap_or(base)
    }
}
