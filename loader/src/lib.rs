//! Configuration document discovery and decoding for configgen schemas.
//!
//! This crate finds the documents of a project (constants, per-environment
//! files, the local override and the flag declarations), decodes TOML and
//! YAML into [`configgen_core::Value`] trees with their comments attached,
//! and hands them to [`configgen_core::SchemaBuilder`].
//!
//! # Quick start
//!
//! ```no_run
//! use configgen_loader::{DocumentSet, ProjectConfig, load_flags};
//!
//! // Settings come from configgen.yml when present
//! let config = ProjectConfig::load_or_default("configgen.yml").unwrap();
//!
//! let set = DocumentSet::discover(&config).unwrap();
//! let schema = set.build(&config).unwrap();
//! for (key, field) in schema.fields() {
//!     println!("{key}: {}", field.kind);
//! }
//!
//! let flags = load_flags(config.flags_path()).unwrap();
//! println!("{} flags", flags.len());
//! ```

mod comments;
mod config;
mod document;
mod error;
mod init;
mod loader;

pub use comments::scan_comments;
pub use config::{DEFAULT_CONFIG_FILE, ProjectConfig};
pub use document::{DocumentFormat, load_document, parse_document};
pub use error::{LoadError, Result};
pub use init::{InitOutcome, init_configs};
pub use loader::{DocumentSet, load_flags};
