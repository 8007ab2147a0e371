//! Starter configuration files for a new project.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{LoadError, Result};

const STARTER_FILES: &[(&str, &str)] = &[
    (
        "value.toml",
        r#"# Constants shared by every environment.

[app]
# Service name
name = "my-service"
version = "0.1.0"
"#,
    ),
    (
        "config_prod.toml",
        r#"# Production configuration.

# HTTP server
[server]
host = "0.0.0.0"
port = 8080
read_timeout = "30s"
write_timeout = "30s"

# Primary database
[db]
host = "localhost"
port = 5432
name = "mydb"
user = "app"
password = "secret"
max_open_conns = 25
max_idle_conns = 5

[redis]
addr = "localhost:6379"
password = ""
db = 0

[log]
# One of debug, info, warn, error
level = "info"
format = "json"
"#,
    ),
    (
        "config_local.toml.example",
        r#"# Copy to config_local.toml and adjust for your machine.
# config_local.toml should not be committed.

[server]
host = "127.0.0.1"
port = 8080
read_timeout = "5s"
write_timeout = "5s"

[db]
host = "localhost"
port = 5432
name = "mydb_dev"
user = "postgres"
password = "postgres"
max_open_conns = 5
max_idle_conns = 2

[redis]
addr = "localhost:6379"
password = ""
db = 0

[log]
level = "debug"
format = "text"
"#,
    ),
    (
        "flags.toml",
        r#"# Feature flags.

[flags.new_catalog_ui]
type = "bool"
default = false
description = "Serve the new catalog UI"

[flags.rollout_stage]
type = "enum"
default = "dev"
values = ["dev", "stg", "prod"]
description = "Current rollout stage"
"#,
    ),
];

/// What happened to one starter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    /// The file already existed and was left untouched.
    Skipped,
}

/// Writes the starter files into `dir`, creating it if needed.
///
/// Returns one `(path, outcome)` entry per starter file, in a fixed order.
///
/// # Errors
///
/// Returns [`LoadError::IoError`] if the directory or a file cannot be
/// created.
pub fn init_configs(dir: impl AsRef<Path>) -> Result<Vec<(PathBuf, InitOutcome)>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(LoadError::IoError)?;

    let mut outcomes = Vec::with_capacity(STARTER_FILES.len());
    for (name, content) in STARTER_FILES {
        let path = dir.join(name);
        if path.exists() {
            info!(file = %name, "skip: already exists");
            outcomes.push((path, InitOutcome::Skipped));
            continue;
        }
        std::fs::write(&path, content)?;
        info!(file = %name, "created");
        outcomes.push((path, InitOutcome::Created));
    }
    Ok(outcomes)
}
