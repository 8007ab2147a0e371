use configgen_core::{
    CommentMap, Document, Fields, ItemKind, Kind, ReconcileMode, SchemaBuilder, SchemaError,
    Value, infer_document, intersect, is_duration, merge, to_identifier, union,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tree(value: serde_json::Value) -> Fields {
    infer_document(&Value::from(value), &CommentMap::new()).unwrap()
}

fn keys(fields: &Fields) -> Vec<&str> {
    fields.keys().map(String::as_str).collect()
}

fn document_a() -> serde_json::Value {
    json!({"server": {"host": "a", "port": 1}})
}

fn document_b() -> serde_json::Value {
    json!({"server": {"host": "b", "port": 2, "extra": "x"}})
}

/// Every key path in `fields`, depth first.
fn paths(fields: &Fields, prefix: &str, out: &mut Vec<String>) {
    for (key, field) in fields {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(children) = field.children() {
            paths(children, &path, out);
        }
        out.push(path);
    }
}

fn sample_documents() -> Vec<Fields> {
    vec![
        tree(json!({
            "server": {"host": "a", "port": 1, "timeout": "5s"},
            "db": {"dsn": "x", "pool": {"size": 4}},
            "tags": ["a"],
        })),
        tree(json!({
            "server": {"host": "b", "port": "1", "timeout": "10s"},
            "db": {"dsn": "y", "pool": {"size": 8, "idle": 2}},
            "debug": true,
        })),
        tree(json!({
            "server": {"host": "c", "timeout": "1m"},
            "db": {"pool": {"size": 1}},
            "tags": [],
        })),
    ]
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn test_intersect_end_to_end() {
    let out = intersect(&[tree(document_a()), tree(document_b())]);
    assert_eq!(keys(&out), vec!["server"]);
    let server = out["server"].children().unwrap();
    assert_eq!(keys(server), vec!["host", "port"]);
    assert_eq!(server["host"].kind, Kind::String);
    assert_eq!(server["port"].kind, Kind::Int);
}

#[test]
fn test_union_end_to_end() {
    let out = union(&[tree(document_a()), tree(document_b())]);
    let server = out["server"].children().unwrap();
    assert_eq!(keys(server), vec!["extra", "host", "port"]);
}

#[test]
fn test_builder_end_to_end() {
    let schema = SchemaBuilder::new(ReconcileMode::Intersect)
        .environment(Document::new("a.toml", Value::from(document_a())))
        .environment(Document::new("b.toml", Value::from(document_b())))
        .build()
        .unwrap();

    let server = schema.get("server").unwrap();
    assert_eq!(server.generated_name.as_deref(), Some("Server"));
    assert_eq!(server.struct_name.as_deref(), Some("Server"));
    assert_eq!(
        schema.get("server.port").unwrap().generated_name.as_deref(),
        Some("Port")
    );
    assert!(schema.get("server.extra").is_none());
}

#[test]
fn test_builder_reports_empty_schema() {
    let err = SchemaBuilder::new(ReconcileMode::Intersect)
        .environment(Document::new("a.toml", Value::from(json!({"a": 1}))))
        .environment(Document::new("b.toml", Value::from(json!({"b": "x"}))))
        .build()
        .unwrap_err();
    assert_eq!(err, SchemaError::EmptySchema);
}

// ---------------------------------------------------------------------------
// Reconciliation properties
// ---------------------------------------------------------------------------

#[test]
fn test_intersect_paths_subset_of_union_paths() {
    let docs = sample_documents();
    let mut common = Vec::new();
    paths(&intersect(&docs), "", &mut common);
    let mut all = Vec::new();
    paths(&union(&docs), "", &mut all);

    assert!(!common.is_empty());
    for path in &common {
        assert!(all.contains(path), "{path} missing from union");
    }
}

#[test]
fn test_intersect_order_independent_for_all_permutations() {
    let docs = sample_documents();
    let expected = intersect(&docs);
    let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    for order in orders {
        let permuted: Vec<Fields> = order.iter().map(|&i| docs[i].clone()).collect();
        assert_eq!(intersect(&permuted), expected, "order {order:?}");
    }
}

#[test]
fn test_intersect_single_tree_is_identity() {
    for doc in sample_documents() {
        assert_eq!(intersect(std::slice::from_ref(&doc)), doc);
    }
}

#[test]
fn test_union_contains_every_input_path() {
    let docs = sample_documents();
    let mut all = Vec::new();
    paths(&union(&docs), "", &mut all);

    for doc in &docs {
        let mut own = Vec::new();
        paths(doc, "", &mut own);
        for path in own {
            // paths below a kind conflict resolved towards a non-object are gone
            let parent_kept = path
                .rsplit_once('.')
                .is_none_or(|(parent, _)| all.iter().any(|p| p == parent));
            if parent_kept {
                assert!(all.contains(&path), "{path} missing from union");
            }
        }
    }
}

#[test]
fn test_merge_layers_leaves_and_unions_objects() {
    let a = tree(json!({"db": {"host": "x", "port": 1}, "level": "info"}));
    let b = tree(json!({"db": {"port": "5432", "name": "n"}, "level": 3}));
    let out = merge(&[a, b]);

    assert_eq!(out["level"].kind, Kind::Int);
    let db = out["db"].children().unwrap();
    assert_eq!(keys(db), vec!["host", "name", "port"]);
    assert_eq!(db["port"].kind, Kind::String);
}

#[test]
fn test_expected_kinds_after_intersect() {
    let out = intersect(&sample_documents());
    assert_eq!(keys(&out), vec!["db", "server"]);
    let server = out["server"].children().unwrap();
    assert_eq!(keys(server), vec!["host", "timeout"]);
    assert_eq!(server["timeout"].kind, Kind::Duration);
    let pool = out["db"].children().unwrap()["pool"].children().unwrap();
    assert_eq!(keys(pool), vec!["size"]);
}

#[test]
fn test_union_slice_item_kind() {
    let out = union(&sample_documents());
    assert_eq!(out["tags"].kind, Kind::Slice(ItemKind::String));
    assert_eq!(out["debug"].kind, Kind::Bool);
}

// ---------------------------------------------------------------------------
// Inference and naming
// ---------------------------------------------------------------------------

#[test]
fn test_duration_classification() {
    for s in ["30s", "5m", "1h", "100ms"] {
        assert!(is_duration(s), "{s}");
    }
    for s in ["hello", "123", "s"] {
        assert!(!is_duration(s), "{s}");
    }
}

#[test]
fn test_name_derivation() {
    assert_eq!(to_identifier("pool_size"), "PoolSize");
    assert_eq!(to_identifier("max_idle_time"), "MaxIdleTime");
    assert_eq!(to_identifier("api_v2"), "ApiV2");
}
