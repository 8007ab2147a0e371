use std::path::Path;

use configgen_core::{ItemKind, Kind, ReconcileMode, SchemaError};
use configgen_loader::{
    DEFAULT_CONFIG_FILE, DocumentSet, InitOutcome, LoadError, ProjectConfig, init_configs,
    load_flags,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).unwrap();
}

fn project(dir: &Path, mode: ReconcileMode) -> ProjectConfig {
    ProjectConfig {
        configs_dir: dir.to_path_buf(),
        mode,
        ..ProjectConfig::default()
    }
}

const DEV: &str = r#"
# Service endpoint
[server]
host = "127.0.0.1"
# Listen port
port = 8080
timeout = "5s"
tags = ["a", "b"]

[debug]
pprof = true
"#;

const PROD_YAML: &str = "\
server:
  host: 0.0.0.0
  port: 80
  timeout: 30s
  tags: [edge]
  tls:
    cert: /etc/cert.pem
";

// ---------------------------------------------------------------------------
// Schema builds
// ---------------------------------------------------------------------------

#[test]
fn test_intersect_across_formats() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "config_dev.toml", DEV);
    write(dir.path(), "config_prod.yaml", PROD_YAML);

    let config = project(dir.path(), ReconcileMode::Intersect);
    let schema = DocumentSet::discover(&config).unwrap().build(&config).unwrap();

    let names: Vec<_> = schema.fields().keys().cloned().collect();
    assert_eq!(names, vec!["server"]);

    let server = schema.get("server").unwrap();
    assert_eq!(server.struct_name.as_deref(), Some("Server"));
    assert_eq!(server.comment.as_deref(), Some("Service endpoint"));
    assert_eq!(schema.get("server.timeout").unwrap().kind, Kind::Duration);
    assert_eq!(
        schema.get("server.tags").unwrap().kind,
        Kind::Slice(ItemKind::String)
    );
    assert_eq!(
        schema.get("server.port").unwrap().comment.as_deref(),
        Some("Listen port")
    );
    assert!(schema.get("server.tls").is_none());
}

#[test]
fn test_union_with_constants() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "value.toml", "[app]\nname = \"svc\"\nversion = \"1.0\"\n");
    write(dir.path(), "config_dev.toml", DEV);
    write(dir.path(), "config_prod.yaml", PROD_YAML);

    let config = project(dir.path(), ReconcileMode::Union);
    let schema = DocumentSet::discover(&config).unwrap().build(&config).unwrap();

    assert!(schema.get("app.version").is_some());
    assert!(schema.get("debug.pprof").is_some());
    assert_eq!(
        schema.get("server.tls").unwrap().struct_name.as_deref(),
        Some("ServerTls")
    );
    assert_eq!(
        schema.get("server.tls.cert").unwrap().generated_name.as_deref(),
        Some("Cert")
    );
}

#[test]
fn test_constants_only() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "value.toml", "[app]\nname = \"svc\"\n");

    let config = project(dir.path(), ReconcileMode::Intersect);
    let schema = DocumentSet::discover(&config).unwrap().build(&config).unwrap();
    assert_eq!(schema.len(), 1);
}

#[test]
fn test_empty_schema_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "config_a.toml", "[only_a]\nx = 1\n");
    write(dir.path(), "config_b.toml", "[only_b]\ny = 1\n");

    let config = project(dir.path(), ReconcileMode::Intersect);
    let err = DocumentSet::discover(&config).unwrap().build(&config).unwrap_err();
    assert!(matches!(err, LoadError::SchemaError(SchemaError::EmptySchema)));
}

#[test]
fn test_local_override_only_layers_in_merge_mode() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "config_dev.toml", "[server]\nport = 1\n");
    write(dir.path(), "config_local.toml", "[server]\nport = 2\nprofile = true\n");

    let config = project(dir.path(), ReconcileMode::Intersect);
    let set = DocumentSet::discover(&config).unwrap();
    assert_eq!(set.environments.len(), 1);
    assert!(set.build(&config).unwrap().get("server.profile").is_none());

    let config = project(dir.path(), ReconcileMode::Merge);
    let schema = set.build(&config).unwrap();
    assert_eq!(schema.get("server.profile").unwrap().kind, Kind::Bool);
}

#[test]
fn test_strict_kinds_rejects_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "config_dev.toml", "[server]\nport = 8080\n");
    write(dir.path(), "config_prod.toml", "[server]\nport = \"8080\"\n");

    let mut config = project(dir.path(), ReconcileMode::Union);
    let set = DocumentSet::discover(&config).unwrap();
    assert_eq!(set.build(&config).unwrap().get("server.port").unwrap().kind, Kind::Int);

    config.strict_kinds = true;
    let err = set.build(&config).unwrap_err();
    match err {
        LoadError::SchemaError(SchemaError::KindConflict { path, .. }) => {
            assert_eq!(path, "server.port");
        }
        other => panic!("expected kind conflict, got {other:?}"),
    }
}

#[test]
fn test_name_collision_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "config_dev.toml", "max-conns = 1\nmax_conns = 2\n");

    let config = project(dir.path(), ReconcileMode::Intersect);
    let err = DocumentSet::discover(&config).unwrap().build(&config).unwrap_err();
    assert!(matches!(
        err,
        LoadError::SchemaError(SchemaError::NameCollision { ref name, .. }) if name == "MaxConns"
    ));
}

#[test]
fn test_unsupported_value_names_document() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "config_dev.yaml", "server:\n  host: ~\n");

    let config = project(dir.path(), ReconcileMode::Intersect);
    let err = DocumentSet::discover(&config).unwrap().build(&config).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("config_dev.yaml"), "{message}");
    assert!(message.contains("server.host"), "{message}");
}

#[test]
fn test_schema_serializes_for_generators() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "config_dev.toml", DEV);

    let config = project(dir.path(), ReconcileMode::Intersect);
    let schema = DocumentSet::discover(&config).unwrap().build(&config).unwrap();
    let json = serde_json::to_value(&schema).unwrap();

    let port = &json["fields"]["server"]["kind"]["object"]["port"];
    assert_eq!(port["kind"], "int");
    assert_eq!(port["generated_name"], "Port");
    assert_eq!(
        json["fields"]["server"]["kind"]["object"]["tags"]["kind"]["slice"],
        "string"
    );
}

// ---------------------------------------------------------------------------
// Project workflow
// ---------------------------------------------------------------------------

#[test]
fn test_project_workflow() {
    let root = tempfile::tempdir().unwrap();
    let configs = root.path().join("deploy");

    let created = init_configs(&configs).unwrap();
    assert!(created.iter().all(|(_, o)| *o == InitOutcome::Created));

    let config = ProjectConfig {
        configs_dir: configs.clone(),
        mode: ReconcileMode::Union,
        ..ProjectConfig::default()
    };
    let config_path = root.path().join(DEFAULT_CONFIG_FILE);
    config.save(&config_path).unwrap();

    let loaded = ProjectConfig::load(&config_path).unwrap();
    assert_eq!(loaded, config);

    let schema = DocumentSet::discover(&loaded).unwrap().build(&loaded).unwrap();
    assert!(schema.get("app.name").is_some());
    assert!(schema.get("db.max_open_conns").is_some());

    let flags = load_flags(loaded.flags_path()).unwrap();
    assert_eq!(
        flags.iter().map(|f| f.key.as_str()).collect::<Vec<_>>(),
        vec!["new_catalog_ui", "rollout_stage"]
    );
}
