//! Diff engine for record reconciliation.
//!
//! Walks two records in parallel and reports, as path-addressed operations,
//! what it takes to layer the second record's information onto the first.
//! The engine is additive: it never reports deletions.
//!
//! # Key Types
//!
//! - [`compute_merge`] / [`ChangeSet`] -- Structural diff producing `Append` / `Replace` operations
//! - [`FieldPolicies`] / [`FieldPolicy`] -- Record-level override table for special fields
//! - [`apply_operations`] -- Layer a change set onto a record
//! - [`RecordDiff`] / [`DiffHunk`] / [`DiffLine`] -- Line-level rendering of two records

pub mod apply;
pub mod engine;
pub mod error;
pub mod policy;
pub mod record_diff;

pub use apply::apply_operations;
pub use engine::{compute_merge, compute_merge_with, ChangeSet};
pub use error::{DiffError, DiffResult};
pub use policy::{DiffOptions, FieldPolicies, FieldPolicy, DEFAULT_IDENTIFIER_SCHEME};
pub use record_diff::{render_record_diff, DiffHunk, DiffLine, RecordDiff};
