//! Generic document tree handed to the type inferencer.
//!
//! Wire formats (TOML, YAML, JSON) are decoded elsewhere and converted into
//! [`Value`]. The inferencer only ever sees these shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A decoded configuration value.
///
/// # Examples
///
/// ```
/// use configgen_core::Value;
///
/// let value = Value::from(serde_json::json!({"server": {"port": 8080}}));
/// let server = value.as_map().unwrap().get("server").unwrap();
/// assert_eq!(server.as_map().unwrap().get("port"), Some(&Value::Int(8080)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// A shape the wire format produced that has no schema counterpart
    /// (datetimes, tagged YAML nodes). Carries a short description.
    Other(String),
}

impl Value {
    /// Short human-readable name of the value's shape, used in diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Other(desc) => desc,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 beyond i64::MAX and real floats both land here
                None => match n.as_f64() {
                    Some(f) if n.is_f64() => Value::Float(f),
                    _ => Value::Other(format!("integer out of range ({n})")),
                },
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
