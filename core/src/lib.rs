//! Typed configuration schemas built from configuration documents.
//!
//! This crate turns decoded configuration documents into one canonical,
//! typed schema for code generation:
//!
//! - [`Value`]: the generic document tree (maps, scalars, arrays).
//! - [`Field`] / [`Kind`]: one typed schema node; objects carry children,
//!   slices carry an [`ItemKind`].
//! - [`infer_document`]: value tree to field tree, including duration
//!   detection ([`is_duration`]).
//! - [`intersect`], [`union`], [`merge`]: reconciliation of per-document
//!   trees, selected per run with [`ReconcileMode`].
//! - [`finalize`]: the single pass attaching generated identifiers
//!   ([`to_identifier`]).
//! - [`validate_flags`]: feature-flag declarations to typed [`FlagDef`]s.
//! - [`SchemaBuilder`]: the whole pipeline for one document set.
//!
//! # Example
//!
//! ```
//! use configgen_core::*;
//!
//! let a = Document::new("config_a.toml", Value::from(serde_json::json!({
//!     "server": {"host": "a", "port": 1}
//! })));
//! let b = Document::new("config_b.toml", Value::from(serde_json::json!({
//!     "server": {"host": "b", "port": 2, "extra": "x"}
//! })));
//!
//! let schema = SchemaBuilder::new(ReconcileMode::Intersect)
//!     .environment(a)
//!     .environment(b)
//!     .build()
//!     .unwrap();
//!
//! let server = schema.get("server").unwrap();
//! assert_eq!(server.struct_name.as_deref(), Some("Server"));
//! assert!(schema.get("server.extra").is_none());
//! ```

mod build;
mod error;
mod infer;
mod naming;
mod reconcile;
mod types;
mod validate;
mod value;

pub use build::{Schema, SchemaBuilder};
pub use error::{Result, SchemaError};
pub use infer::{FLAGS_KEY, infer_document, is_duration};
pub use naming::{finalize, to_identifier};
pub use reconcile::{KindConflict, ReconcileMode, intersect, kind_conflicts, merge, union};
pub use types::*;
pub use validate::{RawFlag, raw_flags, validate_flags};
pub use value::Value;
