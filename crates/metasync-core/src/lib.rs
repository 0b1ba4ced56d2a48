//! Core contracts for metasync.
//!
//! This crate defines the snapshot data model, the persisted document codec
//! and the diff engine that classifies drift between two snapshots.

pub mod codec;
pub mod constraints;
pub mod diff;
pub mod error;
pub mod redaction;
pub mod schema;
pub mod validation;

pub use codec::{from_document, load_snapshot, save_snapshot, snapshot_json_schema, to_document};
pub use constraints::{FkRule, ForeignKey, Index};
pub use diff::{Change, ChangeAction, ChangeKind, Detail, DiffSummary, diff};
pub use error::{Error, Result};
pub use redaction::redact_dsn;
pub use schema::{DatabaseSnapshot, SchemaSnapshot, Snapshot, TableSnapshot};
pub use validation::{ValidationIssue, ValidationReport, validate_snapshot};
