//! Feature-flag declaration validation.
//!
//! Flags are declared as a flat table of entries, independent of the config
//! field tree. [`validate_flags`] checks every entry against the flag grammar
//! and returns typed [`FlagDef`] values sorted by key.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use configgen_core::*;
//!
//! let mut raw = BTreeMap::new();
//! raw.insert("new_ui".to_string(), RawFlag::new("bool", Value::Bool(false)));
//! let flags = validate_flags(raw).unwrap();
//! assert_eq!(flags[0].generated_name, "NewUi");
//!
//! // Default does not match the declared type
//! let mut bad = BTreeMap::new();
//! bad.insert("new_ui".to_string(), RawFlag::new("bool", Value::Int(42)));
//! assert!(matches!(validate_flags(bad), Err(SchemaError::FlagType { .. })));
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::infer::FLAGS_KEY;
use crate::{FlagDef, FlagKind, FlagSpec, Value, to_identifier};

/// A flag entry as declared in a flag file, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFlag {
    /// Declared type: `bool`, `int`, `float`, `string` or `enum`.
    #[serde(rename = "type")]
    pub kind: String,
    pub default: Value,
    #[serde(default)]
    pub description: Option<String>,
    /// Allowed values; only valid for `enum`.
    #[serde(default)]
    pub values: Option<Vec<Value>>,
}

impl RawFlag {
    pub fn new(kind: &str, default: Value) -> Self {
        Self {
            kind: kind.to_string(),
            default,
            description: None,
            values: None,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Adds the enum value list.
    pub fn with_values(mut self, values: Vec<Value>) -> Self {
        self.values = Some(values);
        self
    }
}

/// Validates raw flag entries and returns them sorted by key.
///
/// # Errors
///
/// Returns [`SchemaError::FlagType`] for the first entry that declares an
/// unknown type, has a default of the wrong type, declares `values` on a
/// non-enum flag, or is an enum with missing, empty, duplicate or non-string
/// values or a default outside its values.
pub fn validate_flags(raw: BTreeMap<String, RawFlag>) -> Result<Vec<FlagDef>> {
    raw.into_iter()
        .map(|(key, entry)| validate_flag(key, entry))
        .collect()
}

/// Extracts raw flag entries from the `flags` table of a decoded document.
///
/// A document without a `flags` table yields no entries.
///
/// # Errors
///
/// Returns [`SchemaError::FlagType`] when `flags` is not a table, an entry is
/// not a table, or an entry lacks a string `type` or a `default`.
///
/// # Examples
///
/// ```
/// use configgen_core::*;
///
/// let doc = Value::from(serde_json::json!({
///     "flags": {"new_ui": {"type": "bool", "default": true, "description": "New UI"}}
/// }));
/// let raw = raw_flags(&doc).unwrap();
/// assert_eq!(raw["new_ui"].kind, "bool");
/// assert_eq!(raw["new_ui"].description.as_deref(), Some("New UI"));
/// ```
pub fn raw_flags(document: &Value) -> Result<BTreeMap<String, RawFlag>> {
    let Some(table) = document.as_map().and_then(|root| root.get(FLAGS_KEY)) else {
        return Ok(BTreeMap::new());
    };
    let Some(entries) = table.as_map() else {
        return Err(SchemaError::flag(
            FLAGS_KEY,
            format!("expected a table of flags, got {}", table.type_name()),
        ));
    };

    let mut raw = BTreeMap::new();
    for (key, entry) in entries {
        let Some(fields) = entry.as_map() else {
            return Err(SchemaError::flag(
                key,
                format!("expected a table, got {}", entry.type_name()),
            ));
        };
        let Some(kind) = fields.get("type").and_then(Value::as_str) else {
            return Err(SchemaError::flag(key, "missing string field `type`"));
        };
        let Some(default) = fields.get("default") else {
            return Err(SchemaError::flag(key, "missing field `default`"));
        };
        let description = match fields.get("description") {
            None => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => {
                return Err(SchemaError::flag(
                    key,
                    format!("description must be a string, got {}", other.type_name()),
                ));
            }
        };
        let values = match fields.get("values") {
            None => None,
            Some(Value::Array(items)) => Some(items.clone()),
            Some(other) => {
                return Err(SchemaError::flag(
                    key,
                    format!("values must be a list, got {}", other.type_name()),
                ));
            }
        };

        raw.insert(
            key.clone(),
            RawFlag {
                kind: kind.to_string(),
                default: default.clone(),
                description,
                values,
            },
        );
    }
    Ok(raw)
}

fn validate_flag(key: String, entry: RawFlag) -> Result<FlagDef> {
    let Some(kind) = FlagKind::parse(&entry.kind) else {
        return Err(SchemaError::flag(
            &key,
            format!(
                "unsupported type {:?} (expected bool, int, float, string or enum)",
                entry.kind
            ),
        ));
    };

    if kind != FlagKind::Enum && entry.values.is_some() {
        return Err(SchemaError::flag(
            &key,
            format!("values are only allowed for enum flags, not {kind}"),
        ));
    }

    let spec = match (kind, entry.default) {
        (FlagKind::Bool, Value::Bool(default)) => FlagSpec::Bool { default },
        (FlagKind::Int, Value::Int(default)) => FlagSpec::Int { default },
        (FlagKind::Float, Value::Float(default)) => FlagSpec::Float { default },
        // integer literals widen to float
        (FlagKind::Float, Value::Int(default)) => FlagSpec::Float {
            default: default as f64,
        },
        (FlagKind::String, Value::String(default)) => FlagSpec::String { default },
        (FlagKind::Enum, Value::String(default)) => {
            let values = enum_values(&key, entry.values)?;
            if !values.contains(&default) {
                return Err(SchemaError::flag(
                    &key,
                    format!(
                        "default {default:?} is not one of the allowed values [{}]",
                        values.join(", ")
                    ),
                ));
            }
            FlagSpec::Enum { default, values }
        }
        (kind, other) => {
            let expected = if kind == FlagKind::Enum {
                "string".to_string()
            } else {
                kind.to_string()
            };
            return Err(SchemaError::flag(
                &key,
                format!(
                    "default must be {expected} for type {kind}, got {}",
                    other.type_name()
                ),
            ));
        }
    };

    Ok(FlagDef {
        generated_name: to_identifier(&key),
        key,
        description: entry.description.unwrap_or_default(),
        spec,
    })
}

fn enum_values(key: &str, values: Option<Vec<Value>>) -> Result<Vec<String>> {
    let values = match values {
        Some(values) if !values.is_empty() => values,
        _ => {
            return Err(SchemaError::flag(
                key,
                "enum flags require a non-empty values list",
            ));
        }
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        let s = match value {
            Value::String(s) => s,
            other => {
                return Err(SchemaError::flag(
                    key,
                    format!("enum values must be strings, got {}", other.type_name()),
                ));
            }
        };
        if !seen.insert(s.clone()) {
            return Err(SchemaError::flag(key, format!("duplicate enum value {s:?}")));
        }
        out.push(s);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(key: &str, flag: RawFlag) -> Result<Vec<FlagDef>> {
        let mut raw = BTreeMap::new();
        raw.insert(key.to_string(), flag);
        validate_flags(raw)
    }

    fn strings(values: &[&str]) -> Vec<Value> {
        values.iter().map(|v| Value::String(v.to_string())).collect()
    }

    fn reason(err: SchemaError) -> String {
        match err {
            SchemaError::FlagType { reason, .. } => reason,
            other => panic!("expected FlagType, got {other:?}"),
        }
    }

    #[test]
    fn test_bool_with_int_default_fails() {
        let err = one("beta", RawFlag::new("bool", Value::Int(42))).unwrap_err();
        assert_eq!(
            err,
            SchemaError::FlagType {
                flag: "beta".into(),
                reason: "default must be bool for type bool, got int".into(),
            }
        );
    }

    #[test]
    fn test_enum_default_outside_values_fails() {
        let flag = RawFlag::new("enum", Value::String("prod".into()))
            .with_values(strings(&["dev", "stg"]));
        let msg = reason(one("stage", flag).unwrap_err());
        assert!(msg.contains("\"prod\""), "{msg}");
        assert!(msg.contains("dev, stg"), "{msg}");
    }

    #[test]
    fn test_enum_without_values_fails() {
        let err = one("stage", RawFlag::new("enum", Value::String("dev".into()))).unwrap_err();
        assert!(reason(err).contains("non-empty values"));

        let empty = RawFlag::new("enum", Value::String("dev".into())).with_values(vec![]);
        assert!(one("stage", empty).is_err());
    }

    #[test]
    fn test_values_on_non_enum_fails() {
        let flag = RawFlag::new("int", Value::Int(1)).with_values(vec![Value::Int(1)]);
        let err = one("limit", flag).unwrap_err();
        assert!(reason(err).contains("only allowed for enum"));
    }

    #[test]
    fn test_unknown_type_fails() {
        let err = one("x", RawFlag::new("uuid", Value::String("a".into()))).unwrap_err();
        assert!(reason(err).contains("unsupported type \"uuid\""));
    }

    #[test]
    fn test_enum_values_must_be_unique_strings() {
        let dup = RawFlag::new("enum", Value::String("a".into())).with_values(strings(&["a", "a"]));
        assert!(reason(one("e", dup).unwrap_err()).contains("duplicate"));

        let mixed = RawFlag::new("enum", Value::String("a".into()))
            .with_values(vec![Value::String("a".into()), Value::Int(1)]);
        assert!(reason(one("e", mixed).unwrap_err()).contains("must be strings"));
    }

    #[test]
    fn test_float_accepts_integer_literal() {
        let flags = one("ratio", RawFlag::new("float", Value::Int(2))).unwrap();
        assert_eq!(flags[0].spec, FlagSpec::Float { default: 2.0 });
    }

    #[test]
    fn test_int_rejects_float_and_string_rejects_bool() {
        assert!(one("n", RawFlag::new("int", Value::Float(1.0))).is_err());
        assert!(one("s", RawFlag::new("string", Value::Bool(true))).is_err());
    }

    #[test]
    fn test_valid_flags_are_sorted_and_typed() {
        let mut raw = BTreeMap::new();
        raw.insert(
            "zeta_rollout".to_string(),
            RawFlag::new("float", Value::Float(0.25)).with_description("Rollout share"),
        );
        raw.insert(
            "api_stage".to_string(),
            RawFlag::new("enum", Value::String("dev".into())).with_values(strings(&["dev", "prod"])),
        );
        raw.insert("max_items".to_string(), RawFlag::new("int", Value::Int(10)));
        raw.insert("banner".to_string(), RawFlag::new("string", Value::String("hi".into())));
        raw.insert("new_ui".to_string(), RawFlag::new("bool", Value::Bool(true)));

        let flags = validate_flags(raw).unwrap();
        let keys: Vec<&str> = flags.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["api_stage", "banner", "max_items", "new_ui", "zeta_rollout"]);

        assert_eq!(flags[0].generated_name, "ApiStage");
        assert_eq!(flags[0].enum_values().unwrap(), ["dev", "prod"]);
        assert_eq!(flags[2].spec, FlagSpec::Int { default: 10 });
        assert_eq!(flags[4].description, "Rollout share");
        assert_eq!(flags[4].kind(), FlagKind::Float);
    }

    #[test]
    fn test_raw_flags_extracts_entries() {
        let doc = Value::from(serde_json::json!({
            "server": {"port": 1},
            "flags": {
                "stage": {"type": "enum", "default": "dev", "values": ["dev", "prod"]},
                "beta": {"type": "bool", "default": false},
            }
        }));
        let raw = raw_flags(&doc).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw["stage"].values.as_ref().unwrap().len(), 2);
        assert!(raw["beta"].description.is_none());

        let flags = validate_flags(raw).unwrap();
        assert_eq!(flags[0].key, "beta");
    }

    #[test]
    fn test_raw_flags_without_table_is_empty() {
        let doc = Value::from(serde_json::json!({"server": {"port": 1}}));
        assert!(raw_flags(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_raw_flags_rejects_malformed_entries() {
        let missing_type = Value::from(serde_json::json!({"flags": {"x": {"default": 1}}}));
        assert!(reason(raw_flags(&missing_type).unwrap_err()).contains("`type`"));

        let missing_default = Value::from(serde_json::json!({"flags": {"x": {"type": "int"}}}));
        assert!(reason(raw_flags(&missing_default).unwrap_err()).contains("`default`"));

        let scalar = Value::from(serde_json::json!({"flags": {"x": true}}));
        assert!(raw_flags(&scalar).is_err());

        let values = Value::from(serde_json::json!({
            "flags": {"x": {"type": "enum", "default": "a", "values": "a"}}
        }));
        assert!(reason(raw_flags(&values).unwrap_err()).contains("must be a list"));
    }
}
