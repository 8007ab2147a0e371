//! Document set discovery and schema building.
//!
//! A configs directory holds:
//!
//! - the constants document (`value.toml`), shared by all environments,
//! - environment documents (`config_<env>.{toml,yaml,yml}`),
//! - optionally a local override (`config_local.toml`), used as the last
//!   layer in merge mode,
//! - optionally a flag declaration file (`flags.toml`).
//!
//! ```no_run
//! use configgen_loader::{DocumentSet, ProjectConfig, load_flags};
//!
//! let config = ProjectConfig::default();
//! let set = DocumentSet::discover(&config).unwrap();
//! let schema = set.build(&config).unwrap();
//! let flags = load_flags(config.flags_path()).unwrap();
//! println!("{} fields, {} flags", schema.len(), flags.len());
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use configgen_core::{Document, FlagDef, Schema, SchemaBuilder, raw_flags, validate_flags};
use tracing::{debug, info, warn};

use crate::config::ProjectConfig;
use crate::document::{DocumentFormat, load_document};
use crate::error::{LoadError, Result};

/// All documents discovered for one schema build.
#[derive(Debug, Clone)]
pub struct DocumentSet {
    /// Constants document, if present.
    pub constants: Option<Document>,
    /// Environment documents keyed by environment name, sorted.
    pub environments: BTreeMap<String, Document>,
    /// Local override document, if present.
    pub local_override: Option<Document>,
    source: PathBuf,
}

impl DocumentSet {
    /// Discovers and decodes the documents in `config.configs_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ReadError`] if the directory cannot be listed,
    /// any decoding error of a discovered document,
    /// [`LoadError::DuplicateEnvironment`] when two files name the same
    /// environment, and [`LoadError::NoDocuments`] when neither constants nor
    /// environment documents exist.
    pub fn discover(config: &ProjectConfig) -> Result<Self> {
        let dir = &config.configs_dir;
        let mut file_names = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|err| LoadError::read(dir, err))? {
            let entry = entry?;
            // follows symlinks, unlike DirEntry::file_type
            if entry.path().is_file() {
                file_names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        file_names.sort();

        let mut set = DocumentSet {
            constants: None,
            environments: BTreeMap::new(),
            local_override: None,
            source: dir.clone(),
        };

        let constants_path = config.constants_path();
        for file_name in &file_names {
            let path = dir.join(file_name);
            if path == constants_path {
                set.constants = Some(load_document(&path)?);
                info!(document = %file_name, "loaded constants");
                continue;
            }

            let Some(env) = config.environment_name(file_name) else {
                if DocumentFormat::from_path(&path).is_some() && *file_name != config.flags_file {
                    debug!(document = %file_name, "skipping file outside the naming scheme");
                }
                continue;
            };

            let document = load_document(&path)?;
            if env == config.local_environment {
                if set.local_override.replace(document).is_some() {
                    return Err(LoadError::DuplicateEnvironment(env.to_string()));
                }
                info!(document = %file_name, "loaded local override");
                continue;
            }
            if set.environments.insert(env.to_string(), document).is_some() {
                return Err(LoadError::DuplicateEnvironment(env.to_string()));
            }
            info!(document = %file_name, environment = env, "loaded environment");
        }

        if set.constants.is_none() && set.environments.is_empty() {
            return Err(LoadError::NoDocuments(dir.clone()));
        }
        Ok(set)
    }

    /// Directory the documents were discovered in.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Environment names in build order.
    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(|s| s.as_str())
    }

    /// Converts the set into a [`SchemaBuilder`] configured from `config`.
    pub fn schema_builder(&self, config: &ProjectConfig) -> SchemaBuilder {
        let mut builder = SchemaBuilder::new(config.mode).strict_kinds(config.strict_kinds);
        if let Some(constants) = &self.constants {
            builder = builder.constants(constants.clone());
        }
        for document in self.environments.values() {
            builder = builder.environment(document.clone());
        }
        if let Some(local) = &self.local_override {
            builder = builder.local_override(local.clone());
        }
        builder
    }

    /// Builds the finalized schema.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::SchemaError`] for any inference, reconciliation
    /// or naming failure, including an empty schema.
    pub fn build(&self, config: &ProjectConfig) -> Result<Schema> {
        if self.local_override.is_some() && config.mode != configgen_core::ReconcileMode::Merge {
            debug!(mode = %config.mode, "local override is only layered in merge mode");
        }
        let schema = self.schema_builder(config).build()?;
        info!(
            mode = %config.mode,
            environments = self.environments.len(),
            fields = schema.len(),
            "built schema"
        );
        Ok(schema)
    }
}

/// Loads and validates feature-flag declarations from `path`.
///
/// A missing file or a file without a `flags` table yields no flags.
///
/// # Errors
///
/// Returns decoding errors for the file and [`SchemaError::FlagType`]
/// (wrapped) for any invalid declaration.
///
/// [`SchemaError::FlagType`]: configgen_core::SchemaError::FlagType
pub fn load_flags(path: impl AsRef<Path>) -> Result<Vec<FlagDef>> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no flag file");
        return Ok(Vec::new());
    }

    let document = load_document(path)?;
    let raw = raw_flags(&document.value)?;
    if raw.is_empty() {
        warn!(path = %path.display(), "flag file declares no flags");
    }
    let flags = validate_flags(raw)?;
    info!(flags = flags.len(), "validated flags");
    Ok(flags)
}
