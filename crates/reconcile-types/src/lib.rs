//! Foundation types for record reconciliation.
//!
//! This crate provides the value model, field addressing, and change
//! operation types shared by the diff and merge engines. Every other
//! reconcile crate depends on `reconcile-types`.
//!
//! # Key Types
//!
//! - [`ValueKind`] -- Mapping / Sequence / Scalar classification of a [`Value`]
//! - [`FieldPath`] -- Dotted path addressing a field inside nested mappings
//! - [`Operation`] -- `Append` / `Replace` change operation
//! - [`PersonRecord`] -- Typed builder producing normalized person records
//! - [`ShapeError`] -- Precondition violation when two values disagree in shape

pub mod error;
pub mod operation;
pub mod path;
pub mod record;
pub mod value;

pub use error::ShapeError;
pub use operation::Operation;
pub use path::FieldPath;
pub use record::{
    normalize_offices, ContactOffice, Link, PersonRecord, CAPITOL_OFFICE, DISTRICT_OFFICE,
};
pub use serde_json::{Map, Value};
pub use value::{contains_equal, ValueKind};
