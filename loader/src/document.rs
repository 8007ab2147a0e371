//! Document decoding into the core value tree.
//!
//! TOML is decoded with [`toml`], YAML with [`serde_yaml`]. Both are
//! converted into [`configgen_core::Value`]; shapes without a schema
//! counterpart (TOML datetimes, tagged YAML nodes) become
//! [`Value::Other`] and are rejected later by inference.

use std::collections::BTreeMap;
use std::path::Path;

use configgen_core::{Document, SchemaError, Value};
use tracing::debug;

use crate::comments::scan_comments;
use crate::error::{LoadError, Result};

/// Wire format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Yaml,
}

impl DocumentFormat {
    /// Detects the format from a file extension (`toml`, `yaml`, `yml`).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use configgen_loader::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_path(Path::new("config_dev.yml")), Some(DocumentFormat::Yaml));
    /// assert_eq!(DocumentFormat::from_path(Path::new("config_local.toml.example")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(DocumentFormat::Toml),
            Some("yaml" | "yml") => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

/// Reads and decodes one document, attaching comments scanned from its source.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedFormat`] for unknown extensions,
/// [`LoadError::ReadError`] if the file cannot be read and
/// [`SchemaError::DocumentSyntax`] (wrapped) if decoding fails.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let format =
        DocumentFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.into()))?;
    let text = std::fs::read_to_string(path).map_err(|err| LoadError::read(path, err))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let document = parse_document(&name, &text, format)?;
    debug!(
        document = %name,
        comments = document.comments.len(),
        "decoded document"
    );
    Ok(document)
}

/// Decodes document text that is already in memory.
///
/// # Errors
///
/// Returns [`SchemaError::DocumentSyntax`] naming `name` if the text does
/// not decode.
///
/// # Examples
///
/// ```
/// use configgen_loader::{DocumentFormat, parse_document};
///
/// let doc = parse_document("inline.toml", "# Port\nport = 8080\n", DocumentFormat::Toml).unwrap();
/// assert_eq!(doc.comments["port"], "Port");
/// ```
pub fn parse_document(
    name: &str,
    text: &str,
    format: DocumentFormat,
) -> std::result::Result<Document, SchemaError> {
    let syntax = |message: String| SchemaError::DocumentSyntax {
        document: name.to_string(),
        message,
    };

    let value = match format {
        DocumentFormat::Toml => {
            let table: toml::Table = toml::from_str(text).map_err(|e| syntax(e.message().to_string()))?;
            from_toml(toml::Value::Table(table))
        }
        DocumentFormat::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| syntax(e.to_string()))?;
            from_yaml(value).map_err(syntax)?
        }
    };

    Ok(Document::new(name, value).with_comments(scan_comments(text, format)))
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Int(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(_) => Value::Other("datetime".to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Map(
            table
                .into_iter()
                .map(|(key, value)| (key, from_toml(value)))
                .collect(),
        ),
    }
}

fn from_yaml(value: serde_yaml::Value) -> std::result::Result<Value, String> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None if n.is_f64() => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            None => Value::Other(format!("integer out of range ({n})")),
        },
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<std::result::Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = BTreeMap::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, from_yaml(value)?);
            }
            Value::Map(map)
        }
        serde_yaml::Value::Tagged(tagged) => Value::Other(format!("tagged value {}", tagged.tag)),
    })
}

fn yaml_key(key: serde_yaml::Value) -> std::result::Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("unsupported mapping key: {other:?}")),
    }
}
