//! Error types for schema construction.
//!
//! Every failure aborts the run: none of these are recovered internally.

use thiserror::Error;

/// Errors raised while turning documents into a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A source document could not be decoded.
    #[error("syntax error in {document}: {message}")]
    DocumentSyntax { document: String, message: String },

    /// A value shape the inferencer cannot classify.
    #[error("unsupported value at {path}: {found}")]
    UnsupportedValue { path: String, found: String },

    /// A document root is not a map.
    #[error("document {document} must be a map at the top level, found {found}")]
    NotAnObject { document: String, found: String },

    /// A flag declaration violates the flag grammar.
    #[error("flag {flag:?}: {reason}")]
    FlagType { flag: String, reason: String },

    /// Reconciliation left no top-level fields.
    #[error("empty schema: no fields found across documents")]
    EmptySchema,

    /// The same key path has different kinds across documents (strict mode).
    #[error("conflicting kinds at {path}: {first} vs {second}")]
    KindConflict {
        path: String,
        first: String,
        second: String,
    },

    /// Two keys derive the same generated identifier.
    #[error("generated name {name} is derived from both {first} and {second}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// A key derives an empty identifier (e.g. `"_"`).
    #[error("key {path:?} does not produce a usable identifier")]
    InvalidIdentifier { path: String },
}

impl SchemaError {
    pub(crate) fn flag(flag: &str, reason: impl Into<String>) -> Self {
        SchemaError::FlagType {
            flag: flag.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
