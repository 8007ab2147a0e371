//! Error types for document loading.
//!
//! Covers file access, project configuration parsing, document discovery and
//! every schema error raised while building from the loaded documents.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading documents or building a schema.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// File I/O failure on a known path.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Project configuration could not be parsed or written.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Inference, reconciliation, naming or flag validation failure.
    #[error(transparent)]
    SchemaError(#[from] configgen_core::SchemaError),

    /// File extension is not a supported document format.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Neither a constants file nor any environment file was found.
    #[error("no configuration documents found in {0}")]
    NoDocuments(PathBuf),

    /// Two files declare the same environment (e.g. `.toml` and `.yaml`).
    #[error("environment {0:?} is defined by more than one file")]
    DuplicateEnvironment(String),
}

impl LoadError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::ReadError {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
