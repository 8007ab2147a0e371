//! Schema reconciliation across documents.
//!
//! Per-document field trees are combined into one tree with a
//! [`ReconcileMode`]:
//!
//! - [`intersect`] keeps the keys every document agrees on (same kind).
//! - [`union`] keeps every key from any document.
//! - [`merge`] layers documents left-to-right, later layers overriding leaves.
//!
//! All three borrow their inputs and allocate a new tree.
//!
//! # Example
//!
//! ```
//! use configgen_core::*;
//!
//! let prod = infer_document(
//!     &Value::from(serde_json::json!({"server": {"host": "a", "port": 1}})),
//!     &CommentMap::new(),
//! ).unwrap();
//! let dev = infer_document(
//!     &Value::from(serde_json::json!({"server": {"host": "b", "port": 2, "debug": true}})),
//!     &CommentMap::new(),
//! ).unwrap();
//!
//! let common = intersect(&[prod.clone(), dev.clone()]);
//! assert_eq!(common["server"].children().unwrap().len(), 2);
//!
//! let all = union(&[prod, dev]);
//! assert_eq!(all["server"].children().unwrap().len(), 3);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Field, Fields, Kind};

/// How environment documents are combined into one schema.
///
/// # Examples
///
/// ```
/// use configgen_core::ReconcileMode;
///
/// let mode: ReconcileMode = "union".parse().unwrap();
/// assert_eq!(mode, ReconcileMode::Union);
/// assert_eq!(ReconcileMode::default(), ReconcileMode::Intersect);
/// assert!("both".parse::<ReconcileMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Only fields present in every document with the same kind.
    #[default]
    Intersect,
    /// Every field from any document; first document wins kind conflicts.
    Union,
    /// Documents layered in order; later leaves override earlier ones.
    Merge,
}

impl ReconcileMode {
    /// Combines `trees` with this mode.
    pub fn apply(self, trees: &[Fields]) -> Fields {
        match self {
            ReconcileMode::Intersect => intersect(trees),
            ReconcileMode::Union => union(trees),
            ReconcileMode::Merge => merge(trees),
        }
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReconcileMode::Intersect => "intersect",
            ReconcileMode::Union => "union",
            ReconcileMode::Merge => "merge",
        };
        f.write_str(name)
    }
}

impl FromStr for ReconcileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intersect" => Ok(ReconcileMode::Intersect),
            "union" => Ok(ReconcileMode::Union),
            "merge" => Ok(ReconcileMode::Merge),
            other => Err(format!(
                "unknown mode {other:?} (expected intersect, union or merge)"
            )),
        }
    }
}

/// A key path whose kind differs between two documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindConflict {
    pub path: String,
    pub first: String,
    pub second: String,
}

impl fmt::Display for KindConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} vs {}", self.path, self.first, self.second)
    }
}

/// Returns the fields present in every tree with the same kind.
///
/// Objects are intersected recursively and dropped when no child survives.
/// Zero trees yield an empty result; a single tree is returned as is.
///
/// # Examples
///
/// ```
/// use configgen_core::*;
///
/// let mut a = Fields::new();
/// a.insert("port".into(), Field::new("port", Kind::Int));
/// let mut b = Fields::new();
/// b.insert("port".into(), Field::new("port", Kind::String));
///
/// assert!(intersect(&[a, b]).is_empty()); // kinds disagree
/// ```
pub fn intersect(trees: &[Fields]) -> Fields {
    match trees {
        [] => Fields::new(),
        [first, rest @ ..] => rest
            .iter()
            .fold(first.clone(), |acc, tree| intersect_two(&acc, tree)),
    }
}

fn intersect_two(a: &Fields, b: &Fields) -> Fields {
    let mut out = Fields::new();

    for (key, fa) in a {
        let Some(fb) = b.get(key) else {
            continue;
        };
        if !fa.kind.same_shape(&fb.kind) {
            continue;
        }

        let field = match (&fa.kind, &fb.kind) {
            (Kind::Object(ca), Kind::Object(cb)) => {
                let children = intersect_two(ca, cb);
                if children.is_empty() {
                    continue;
                }
                let mut field = fa.with_kind(Kind::Object(children));
                field.comment = pick_comment(fa, fb);
                field
            }
            _ => {
                let mut field = fa.with_kind(fa.kind.clone());
                field.comment = pick_comment(fa, fb);
                field
            }
        };
        out.insert(key.clone(), field);
    }

    out
}

/// Returns every field present in any tree.
///
/// Objects present in several trees are unioned recursively. When a key has
/// different kinds across trees, the first tree in order wins; see
/// [`kind_conflicts`] to detect those cases.
///
/// # Examples
///
/// ```
/// use configgen_core::*;
///
/// let mut a = Fields::new();
/// a.insert("port".into(), Field::new("port", Kind::Int));
/// let mut b = Fields::new();
/// b.insert("port".into(), Field::new("port", Kind::String));
/// b.insert("host".into(), Field::new("host", Kind::String));
///
/// let all = union(&[a, b]);
/// assert_eq!(all.len(), 2);
/// assert_eq!(all["port"].kind, Kind::Int);
/// ```
pub fn union(trees: &[Fields]) -> Fields {
    let mut out = Fields::new();

    for tree in trees {
        for (key, field) in tree {
            let combined = match out.get(key) {
                None => field.with_kind(field.kind.clone()),
                Some(existing) => match (&existing.kind, &field.kind) {
                    (Kind::Object(ca), Kind::Object(cb)) => {
                        let children = union(&[ca.clone(), cb.clone()]);
                        let mut combined = existing.with_kind(Kind::Object(children));
                        combined.comment = pick_comment(existing, field);
                        combined
                    }
                    _ => {
                        if existing.comment.is_some() || field.comment.is_none() {
                            continue;
                        }
                        let mut kept = existing.clone();
                        kept.comment = field.comment.clone();
                        kept
                    }
                },
            };
            out.insert(key.clone(), combined);
        }
    }

    out
}

/// Layers `trees` left-to-right.
///
/// A later leaf replaces the earlier field's kind. Objects present in both
/// layers merge recursively, so a later layer can override one leaf while
/// keeping its siblings. A later non-object replaces an earlier object and
/// vice versa. A field without a comment keeps the earlier layer's comment.
///
/// # Examples
///
/// ```
/// use configgen_core::*;
///
/// let defaults = infer_document(
///     &Value::from(serde_json::json!({"db": {"host": "localhost", "port": 5432}})),
///     &CommentMap::new(),
/// ).unwrap();
/// let local = infer_document(
///     &Value::from(serde_json::json!({"db": {"port": "5433"}})),
///     &CommentMap::new(),
/// ).unwrap();
///
/// let merged = merge(&[defaults, local]);
/// let db = merged["db"].children().unwrap();
/// assert_eq!(db["host"].kind, Kind::String);
/// assert_eq!(db["port"].kind, Kind::String); // overridden by the later layer
/// ```
pub fn merge(trees: &[Fields]) -> Fields {
    let mut out = Fields::new();

    for tree in trees {
        for (key, field) in tree {
            let mut layered = match (out.get(key).map(|f| &f.kind), &field.kind) {
                (Some(Kind::Object(earlier)), Kind::Object(later)) => {
                    let children = merge(&[earlier.clone(), later.clone()]);
                    field.with_kind(Kind::Object(children))
                }
                _ => field.with_kind(field.kind.clone()),
            };
            if layered.comment.is_none() {
                layered.comment = out.get(key).and_then(|f| f.comment.clone());
            }
            out.insert(key.clone(), layered);
        }
    }

    out
}

/// Reports every key path whose kind differs between trees.
///
/// Each path is compared against the first tree that defines it. Objects are
/// walked recursively.
///
/// # Examples
///
/// ```
/// use configgen_core::*;
///
/// let mut a = Fields::new();
/// a.insert("port".into(), Field::new("port", Kind::Int));
/// let mut b = Fields::new();
/// b.insert("port".into(), Field::new("port", Kind::String));
///
/// let conflicts = kind_conflicts(&[a, b]);
/// assert_eq!(conflicts.len(), 1);
/// assert_eq!(conflicts[0].path, "port");
/// ```
pub fn kind_conflicts(trees: &[Fields]) -> Vec<KindConflict> {
    let mut conflicts = Vec::new();
    let refs: Vec<&Fields> = trees.iter().collect();
    collect_conflicts(&refs, "", &mut conflicts);
    conflicts
}

fn collect_conflicts<'a>(trees: &[&'a Fields], prefix: &str, out: &mut Vec<KindConflict>) {
    let mut seen: BTreeMap<&'a str, &'a Kind> = BTreeMap::new();
    let mut nested: Vec<(String, Vec<&'a Fields>)> = Vec::new();

    for &tree in trees {
        for (key, field) in tree {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            match seen.get(key.as_str()) {
                None => {
                    seen.insert(key.as_str(), &field.kind);
                }
                Some(first) if !first.same_shape(&field.kind) => {
                    out.push(KindConflict {
                        path,
                        first: first.to_string(),
                        second: field.kind.to_string(),
                    });
                    continue;
                }
                Some(_) => {}
            }

            if let Kind::Object(children) = &field.kind {
                match nested.iter_mut().find(|(p, _)| *p == path) {
                    Some((_, group)) => group.push(children),
                    None => nested.push((path, vec![children])),
                }
            }
        }
    }

    for (path, group) in nested {
        if group.len() > 1 {
            collect_conflicts(&group, &path, out);
        }
    }
}

fn pick_comment(first: &Field, second: &Field) -> Option<String> {
    first.comment.clone().or_else(|| second.comment.clone())
}
