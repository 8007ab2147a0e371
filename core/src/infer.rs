//! Type inference from generic value trees.
//!
//! [`infer_document`] walks a decoded [`Value`] map and produces the typed
//! [`Fields`] tree for one document. Strings that look like durations
//! (`"30s"`, `"1h30m"`) are classified as [`Kind::Duration`].
//!
//! # Example
//!
//! ```
//! use configgen_core::*;
//!
//! let value = Value::from(serde_json::json!({
//!     "server": {"host": "0.0.0.0", "timeout": "30s", "tags": ["a", "b"]}
//! }));
//! let fields = infer_document(&value, &CommentMap::new()).unwrap();
//! let server = fields["server"].children().unwrap();
//! assert_eq!(server["host"].kind, Kind::String);
//! assert_eq!(server["timeout"].kind, Kind::Duration);
//! assert_eq!(server["tags"].kind, Kind::Slice(ItemKind::String));
//! ```

use std::collections::BTreeMap;

use crate::error::{Result, SchemaError};
use crate::{CommentMap, Field, Fields, ItemKind, Kind, Value};

/// Top-level key reserved for feature-flag declarations.
pub const FLAGS_KEY: &str = "flags";

const DURATION_SUFFIXES: [&str; 7] = ["ns", "us", "µs", "ms", "s", "m", "h"];

/// Magnitude of the most negative representable duration, in nanoseconds.
const DURATION_LIMIT: u64 = 1 << 63;

/// Infers the field tree of one document.
///
/// The reserved top-level [`FLAGS_KEY`] is skipped. Comments are attached by
/// dotted key path.
///
/// # Errors
///
/// Returns [`SchemaError::NotAnObject`] if `value` is not a map, and
/// [`SchemaError::UnsupportedValue`] (with the full key path) for nulls and
/// other unclassifiable shapes.
pub fn infer_document(value: &Value, comments: &CommentMap) -> Result<Fields> {
    let Some(root) = value.as_map() else {
        return Err(SchemaError::NotAnObject {
            document: "<root>".to_string(),
            found: value.type_name().to_string(),
        });
    };

    let mut fields = Fields::new();
    for (key, value) in root {
        if key == FLAGS_KEY {
            continue;
        }
        fields.insert(key.clone(), infer_field(key, value, key, comments)?);
    }
    Ok(fields)
}

fn infer_map(
    map: &BTreeMap<String, Value>,
    prefix: &str,
    comments: &CommentMap,
) -> Result<Fields> {
    let mut fields = Fields::new();
    for (key, value) in map {
        let path = format!("{prefix}.{key}");
        fields.insert(key.clone(), infer_field(key, value, &path, comments)?);
    }
    Ok(fields)
}

fn infer_field(key: &str, value: &Value, path: &str, comments: &CommentMap) -> Result<Field> {
    let kind = match value {
        Value::String(s) if is_duration(s) => Kind::Duration,
        Value::String(_) => Kind::String,
        Value::Int(_) => Kind::Int,
        Value::Float(_) => Kind::Float,
        Value::Bool(_) => Kind::Bool,
        Value::Array(items) => Kind::Slice(infer_item_kind(items, path)?),
        Value::Map(map) => Kind::Object(infer_map(map, path, comments)?),
        Value::Null | Value::Other(_) => return Err(unsupported(path, value)),
    };

    let mut field = Field::new(key, kind);
    field.comment = comments.get(path).cloned();
    Ok(field)
}

// First element decides; the rest are not checked.
fn infer_item_kind(items: &[Value], path: &str) -> Result<ItemKind> {
    let Some(first) = items.first() else {
        return Ok(ItemKind::String);
    };
    match first {
        Value::String(_) => Ok(ItemKind::String),
        Value::Int(_) => Ok(ItemKind::Int),
        Value::Float(_) => Ok(ItemKind::Float),
        Value::Bool(_) => Ok(ItemKind::Bool),
        other => Err(unsupported(&format!("{path}[0]"), other)),
    }
}

fn unsupported(path: &str, value: &Value) -> SchemaError {
    SchemaError::UnsupportedValue {
        path: path.to_string(),
        found: value.type_name().to_string(),
    }
}

/// Returns `true` if `s` is a duration literal with a unit suffix.
///
/// The grammar is an optional sign followed by one or more
/// `<digits>[.<digits>]<unit>` groups (`"1h30m"`, `"1.5s"`, `"-250ms"`).
///
/// # Examples
///
/// ```
/// use configgen_core::is_duration;
///
/// assert!(is_duration("30s"));
/// assert!(is_duration("1h30m"));
/// assert!(!is_duration("123"));
/// assert!(!is_duration("s"));
/// ```
pub fn is_duration(s: &str) -> bool {
    parses_as_duration(s) && has_unit_suffix(s)
}

fn has_unit_suffix(s: &str) -> bool {
    DURATION_SUFFIXES
        .iter()
        .any(|suffix| s.len() > suffix.len() && s.ends_with(suffix))
}

fn parses_as_duration(s: &str) -> bool {
    duration_nanos(s).is_some()
}

/// Total length of a duration literal in nanoseconds, or `None` when it is
/// malformed or does not fit a signed 64-bit nanosecond count.
fn duration_nanos(s: &str) -> Option<u64> {
    let negative = s.starts_with('-');
    let mut rest = s.strip_prefix(['+', '-']).unwrap_or(s);
    if rest == "0" {
        return Some(0);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        let int_len = leading_digits(rest);
        let whole = leading_int(&rest[..int_len])?;
        rest = &rest[int_len..];

        let mut frac_len = 0;
        let mut fraction = (0, 1.0);
        if let Some(after_dot) = rest.strip_prefix('.') {
            frac_len = leading_digits(after_dot);
            fraction = leading_fraction(&after_dot[..frac_len]);
            rest = &after_dot[frac_len..];
        }
        if int_len == 0 && frac_len == 0 {
            return None;
        }

        let unit_len = rest
            .char_indices()
            .find(|(_, c)| *c == '.' || c.is_ascii_digit())
            .map_or(rest.len(), |(idx, _)| idx);
        let unit = unit_nanos(&rest[..unit_len])?;
        rest = &rest[unit_len..];

        let mut value = whole.checked_mul(unit).filter(|v| *v <= DURATION_LIMIT)?;
        let (digits, scale) = fraction;
        if digits > 0 {
            value = value
                .checked_add((digits as f64 * (unit as f64 / scale)) as u64)
                .filter(|v| *v <= DURATION_LIMIT)?;
        }
        total = total.checked_add(value).filter(|v| *v <= DURATION_LIMIT)?;
    }

    if !negative && total > DURATION_LIMIT - 1 {
        return None;
    }
    Some(total)
}

fn unit_nanos(unit: &str) -> Option<u64> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}

fn leading_int(digits: &str) -> Option<u64> {
    digits.bytes().try_fold(0u64, |acc, b| {
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(b - b'0')))
            .filter(|v| *v <= DURATION_LIMIT)
    })
}

/// Fraction digits as `(value, scale)`; digits past u64 precision are dropped.
fn leading_fraction(digits: &str) -> (u64, f64) {
    let mut value: u64 = 0;
    let mut scale = 1.0;
    for b in digits.bytes() {
        let Some(next) = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(b - b'0')))
        else {
            break;
        };
        value = next;
        scale *= 10.0;
    }
    (value, scale)
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}
