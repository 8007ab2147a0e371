//! Project configuration for schema builds.
//!
//! Describes where configuration documents live, how they are named and how
//! environment documents are reconciled. Every field has a default, so an
//! empty (or absent) `configgen.yml` is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! configs_dir: ./configs
//! constants_file: value.toml
//! environment_prefix: config_
//! local_environment: local
//! flags_file: flags.toml
//! mode: intersect
//! strict_kinds: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use configgen_core::ReconcileMode;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};

/// Default file name of the project configuration.
pub const DEFAULT_CONFIG_FILE: &str = "configgen.yml";

/// Project-level settings for discovering and reconciling documents.
///
/// # Examples
///
/// ```
/// use configgen_loader::ProjectConfig;
///
/// let config: ProjectConfig = serde_yaml::from_str("mode: union\n").unwrap();
/// assert_eq!(config.mode.to_string(), "union");
/// assert_eq!(config.constants_file, "value.toml");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory holding the configuration documents.
    pub configs_dir: PathBuf,
    /// Constants document shared by all environments.
    pub constants_file: String,
    /// File name prefix of environment documents (`config_dev.toml`).
    pub environment_prefix: String,
    /// Environment name treated as the local override layer.
    pub local_environment: String,
    /// Feature-flag declaration file, relative to `configs_dir`.
    pub flags_file: String,
    /// How environment documents are combined.
    pub mode: ReconcileMode,
    /// Reject kind conflicts between documents instead of resolving them.
    pub strict_kinds: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            configs_dir: PathBuf::from("./configs"),
            constants_file: "value.toml".to_string(),
            environment_prefix: "config_".to_string(),
            local_environment: "local".to_string(),
            flags_file: "flags.toml".to_string(),
            mode: ReconcileMode::default(),
            strict_kinds: false,
        }
    }
}

impl ProjectConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`](crate::LoadError::ReadError) if the file cannot
    /// be opened, or [`YamlError`](crate::LoadError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|err| LoadError::read(path, err))?;
        let reader = BufReader::new(file);
        // an empty file decodes as null rather than as an empty mapping
        let value: serde_yaml::Value = serde_yaml::from_reader(reader)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(value)?)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) for an existing file.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::LoadError::IoError) if the file cannot be
    /// written, or [`YamlError`](crate::LoadError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Path of the constants document.
    pub fn constants_path(&self) -> PathBuf {
        self.configs_dir.join(&self.constants_file)
    }

    /// Path of the flag declaration file.
    pub fn flags_path(&self) -> PathBuf {
        self.configs_dir.join(&self.flags_file)
    }

    /// Environment name encoded in `file_name`, if it is an environment
    /// document (`config_dev.toml` → `dev`).
    ///
    /// # Examples
    ///
    /// ```
    /// use configgen_loader::ProjectConfig;
    ///
    /// let config = ProjectConfig::default();
    /// assert_eq!(config.environment_name("config_prod.yaml"), Some("prod"));
    /// assert_eq!(config.environment_name("config_local.toml.example"), None);
    /// assert_eq!(config.environment_name("value.toml"), None);
    /// ```
    pub fn environment_name<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let rest = file_name.strip_prefix(self.environment_prefix.as_str())?;
        let (name, ext) = rest.rsplit_once('.')?;
        let supported = matches!(ext, "toml" | "yaml" | "yml");
        (supported && !name.is_empty() && !name.contains('.')).then_some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
configs_dir: ./deploy/configs
constants_file: constants.yaml
environment_prefix: env_
local_environment: dev-local
flags_file: features.toml
mode: merge
strict_kinds: true
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: ProjectConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.configs_dir, PathBuf::from("./deploy/configs"));
        assert_eq!(config.constants_file, "constants.yaml");
        assert_eq!(config.environment_prefix, "env_");
        assert_eq!(config.local_environment, "dev-local");
        assert_eq!(config.flags_file, "features.toml");
        assert_eq!(config.mode, ReconcileMode::Merge);
        assert!(config.strict_kinds);
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: ProjectConfig = serde_yaml::from_str("strict_kinds: true\n").unwrap();
        assert!(config.strict_kinds);
        assert_eq!(config.mode, ReconcileMode::Intersect);
        assert_eq!(config.environment_prefix, "config_");
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result: std::result::Result<ProjectConfig, _> = serde_yaml::from_str("mode: both\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_environment_name_with_custom_prefix() {
        let config: ProjectConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.environment_name("env_stg.yml"), Some("stg"));
        assert_eq!(config.environment_name("config_stg.yml"), None);
        assert_eq!(config.environment_name("env_.toml"), None);
        assert_eq!(config.environment_name("env_stg.json"), None);
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let original: ProjectConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();
        assert_eq!(ProjectConfig::load(&path).unwrap(), original);
    }

    #[test]
    fn test_load_empty_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.yml");
        std::fs::write(&empty, "").unwrap();
        assert_eq!(ProjectConfig::load(&empty).unwrap(), ProjectConfig::default());

        let missing = dir.path().join("missing.yml");
        assert_eq!(
            ProjectConfig::load_or_default(&missing).unwrap(),
            ProjectConfig::default()
        );
        assert!(matches!(
            ProjectConfig::load(&missing),
            Err(LoadError::ReadError { .. })
        ));
    }
}
