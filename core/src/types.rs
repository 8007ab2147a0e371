//! Schema type definitions for configuration structure modeling.
//!
//! This module defines the typed field tree produced by inference and
//! consumed by reconciliation, plus the feature-flag declarations. The types
//! serialize with [`serde`] so a finalized schema can be handed to a code
//! generator as JSON or YAML.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Children of an object field (or the top level of a document), sorted by key.
pub type Fields = BTreeMap<String, Field>;

/// Dotted key path (`server.port`) to free-text comment.
pub type CommentMap = HashMap<String, String>;

/// Scalar kind of slice elements.
///
/// # Examples
///
/// ```
/// use configgen_core::ItemKind;
///
/// assert_eq!(ItemKind::default(), ItemKind::String);
/// assert_eq!(ItemKind::Float.to_string(), "float");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Also the item kind of an empty array.
    #[default]
    String,
    Int,
    Float,
    Bool,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::String => "string",
            ItemKind::Int => "int",
            ItemKind::Float => "float",
            ItemKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Type tag of a [`Field`].
///
/// Only `Slice` carries an item kind and only `Object` carries children, so
/// a scalar field with children cannot be constructed.
///
/// # Examples
///
/// ```
/// use configgen_core::{ItemKind, Kind};
///
/// let ints = Kind::Slice(ItemKind::Int);
/// assert!(ints.same_shape(&Kind::Slice(ItemKind::Int)));
/// assert!(!ints.same_shape(&Kind::Slice(ItemKind::String)));
/// assert_eq!(ints.to_string(), "[]int");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    String,
    Int,
    Float,
    Bool,
    Duration,
    Slice(ItemKind),
    Object(Fields),
}

impl Kind {
    /// Returns `true` when both kinds carry the same tag and, for slices, the
    /// same item kind. Object children are not compared.
    pub fn same_shape(&self, other: &Kind) -> bool {
        match (self, other) {
            (Kind::Slice(a), Kind::Slice(b)) => a == b,
            (Kind::Object(_), Kind::Object(_)) => true,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Kind::Object(_))
    }

    pub fn children(&self) -> Option<&Fields> {
        match self {
            Kind::Object(children) => Some(children),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::String => f.write_str("string"),
            Kind::Int => f.write_str("int"),
            Kind::Float => f.write_str("float"),
            Kind::Bool => f.write_str("bool"),
            Kind::Duration => f.write_str("duration"),
            Kind::Slice(item) => write!(f, "[]{item}"),
            Kind::Object(_) => f.write_str("object"),
        }
    }
}

/// One node of a typed configuration schema.
///
/// Fields are created by inference, combined by the reconciler and annotated
/// with generated names by [`finalize`](crate::finalize).
///
/// # Examples
///
/// ```
/// use configgen_core::{Field, Fields, Kind};
///
/// let port = Field::new("port", Kind::Int).with_comment("Listen port");
/// let mut children = Fields::new();
/// children.insert(port.key.clone(), port);
///
/// let server = Field::object("server", children);
/// assert_eq!(server.children().unwrap().len(), 1);
/// assert!(server.generated_name.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Original source key.
    pub key: String,
    pub kind: Kind,
    /// Identifier derived from `key`; set by finalize.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_name: Option<String>,
    /// Path-qualified type name; set by finalize on object fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Field {
    pub fn new(key: impl Into<String>, kind: Kind) -> Self {
        Self {
            key: key.into(),
            kind,
            generated_name: None,
            struct_name: None,
            comment: None,
        }
    }

    /// Creates an object field from its children.
    pub fn object(key: impl Into<String>, children: Fields) -> Self {
        Self::new(key, Kind::Object(children))
    }

    /// Adds a comment.
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn children(&self) -> Option<&Fields> {
        self.kind.children()
    }

    /// Copy of this field with `kind` swapped in and the derived names cleared.
    pub(crate) fn with_kind(&self, kind: Kind) -> Self {
        Self {
            key: self.key.clone(),
            kind,
            generated_name: None,
            struct_name: None,
            comment: self.comment.clone(),
        }
    }
}

/// One source document after decoding, ready for inference.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Logical source name (usually the file name), used in diagnostics.
    pub name: String,
    pub value: Value,
    pub comments: CommentMap,
}

impl Document {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            comments: CommentMap::new(),
        }
    }

    /// Attaches comments scanned from the document source.
    pub fn with_comments(mut self, comments: CommentMap) -> Self {
        self.comments = comments;
        self
    }
}

/// Declared type of a feature flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    Bool,
    Int,
    Float,
    String,
    Enum,
}

impl FlagKind {
    /// Parses the type string used in flag files.
    ///
    /// # Examples
    ///
    /// ```
    /// use configgen_core::FlagKind;
    ///
    /// assert_eq!(FlagKind::parse("enum"), Some(FlagKind::Enum));
    /// assert_eq!(FlagKind::parse("uuid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bool" => Some(FlagKind::Bool),
            "int" => Some(FlagKind::Int),
            "float" => Some(FlagKind::Float),
            "string" => Some(FlagKind::String),
            "enum" => Some(FlagKind::Enum),
            _ => None,
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlagKind::Bool => "bool",
            FlagKind::Int => "int",
            FlagKind::Float => "float",
            FlagKind::String => "string",
            FlagKind::Enum => "enum",
        };
        f.write_str(name)
    }
}

/// Typed default of a flag. The variant fixes the flag kind, and only
/// `Enum` carries the allowed value list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlagSpec {
    Bool { default: bool },
    Int { default: i64 },
    Float { default: f64 },
    String { default: String },
    Enum { default: String, values: Vec<String> },
}

/// A validated feature-flag declaration.
///
/// Produced by [`validate_flags`](crate::validate_flags); the default always
/// type-checks against the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDef {
    pub key: String,
    pub generated_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub spec: FlagSpec,
}

impl FlagDef {
    pub fn kind(&self) -> FlagKind {
        match self.spec {
            FlagSpec::Bool { .. } => FlagKind::Bool,
            FlagSpec::Int { .. } => FlagKind::Int,
            FlagSpec::Float { .. } => FlagKind::Float,
            FlagSpec::String { .. } => FlagKind::String,
            FlagSpec::Enum { .. } => FlagKind::Enum,
        }
    }

    /// Allowed values; `Some` iff the flag is an enum.
    pub fn enum_values(&self) -> Option<&[String]> {
        match &self.spec {
            FlagSpec::Enum { values, .. } => Some(values),
            _ => None,
        }
    }
}
