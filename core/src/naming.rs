//! Generated identifier derivation.
//!
//! [`finalize`] is the one pass that mutates a field tree: it runs once on
//! the reconciled schema and attaches `generated_name` to every field and a
//! path-qualified `struct_name` to every object.

use std::collections::HashMap;

use crate::error::{Result, SchemaError};
use crate::{Field, Fields, Kind};

/// Converts a source key into a PascalCase identifier.
///
/// `_`, `-` and space separate segments and are dropped; the first ASCII
/// lowercase letter of each segment is upper-cased.
///
/// # Examples
///
/// ```
/// use configgen_core::to_identifier;
///
/// assert_eq!(to_identifier("pool_size"), "PoolSize");
/// assert_eq!(to_identifier("max-idle time"), "MaxIdleTime");
/// assert_eq!(to_identifier("api_v2"), "ApiV2");
/// ```
pub fn to_identifier(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut cap_next = true;
    for c in key.chars() {
        if matches!(c, '_' | '-' | ' ') {
            cap_next = true;
            continue;
        }
        if cap_next {
            out.push(c.to_ascii_uppercase());
            cap_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Annotates `fields` with generated names in place.
///
/// Every field gets `generated_name = to_identifier(key)`; every object also
/// gets `struct_name`, its parent's struct name followed by its own generated
/// name, so same-named sections at different depths never share a type name.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidIdentifier`] for keys that derive an empty
/// name, and [`SchemaError::NameCollision`] when two siblings derive the same
/// generated name or two objects anywhere derive the same struct name.
///
/// # Examples
///
/// ```
/// use configgen_core::*;
///
/// let mut fields = infer_document(
///     &Value::from(serde_json::json!({"db": {"pool": {"max_size": 4}}})),
///     &CommentMap::new(),
/// ).unwrap();
/// finalize(&mut fields).unwrap();
///
/// let db = &fields["db"];
/// assert_eq!(db.struct_name.as_deref(), Some("Db"));
/// let pool = &db.children().unwrap()["pool"];
/// assert_eq!(pool.struct_name.as_deref(), Some("DbPool"));
/// assert_eq!(
///     pool.children().unwrap()["max_size"].generated_name.as_deref(),
///     Some("MaxSize"),
/// );
/// ```
pub fn finalize(fields: &mut Fields) -> Result<()> {
    let mut struct_names = HashMap::new();
    annotate(fields, "", "", &mut struct_names)
}

fn annotate(
    fields: &mut Fields,
    path_prefix: &str,
    struct_prefix: &str,
    struct_names: &mut HashMap<String, String>,
) -> Result<()> {
    let mut sibling_names: HashMap<String, &str> = HashMap::new();

    for (key, field) in fields.iter_mut() {
        let path = if path_prefix.is_empty() {
            key.clone()
        } else {
            format!("{path_prefix}.{key}")
        };

        let name = to_identifier(key);
        if name.is_empty() {
            return Err(SchemaError::InvalidIdentifier { path });
        }
        if let Some(previous) = sibling_names.insert(name.clone(), key) {
            return Err(SchemaError::NameCollision {
                name,
                first: qualify(path_prefix, previous),
                second: path,
            });
        }

        annotate_field(field, name, &path, struct_prefix, struct_names)?;
    }

    Ok(())
}

fn annotate_field(
    field: &mut Field,
    name: String,
    path: &str,
    struct_prefix: &str,
    struct_names: &mut HashMap<String, String>,
) -> Result<()> {
    field.struct_name = None;
    if let Kind::Object(children) = &mut field.kind {
        let struct_name = format!("{struct_prefix}{name}");
        if let Some(previous) = struct_names.insert(struct_name.clone(), path.to_string()) {
            return Err(SchemaError::NameCollision {
                name: struct_name,
                first: previous,
                second: path.to_string(),
            });
        }
        annotate(children, path, &struct_name, struct_names)?;
        field.struct_name = Some(struct_name);
    }
    field.generated_name = Some(name);
    Ok(())
}

fn qualify(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
