use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use configgen_core::{FlagDef, Fields, ReconcileMode, Schema, infer_document, kind_conflicts};
use configgen_loader::{
    DEFAULT_CONFIG_FILE, DocumentSet, InitOutcome, ProjectConfig, init_configs, load_flags,
};
use serde::Serialize;
use tracing::{debug, info};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

/// Reconciliation mode as accepted on the command line.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliMode {
    /// Keep only fields present in every environment.
    Intersect,
    /// Keep every field of any environment.
    Union,
    /// Layer environments in order, later ones win.
    Merge,
}

impl From<CliMode> for ReconcileMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Intersect => Self::Intersect,
            CliMode::Union => Self::Union,
            CliMode::Merge => Self::Merge,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "configgen", version)]
#[command(about = "Build typed configuration schemas from TOML/YAML documents")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
    /// Project configuration file (default: ./configgen.yml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the schema and print or write it.
    Schema(SchemaArgs),
    /// Validate and print feature-flag definitions.
    Flags(FlagsArgs),
    /// Build schema and flags, print a summary.
    Check(CheckArgs),
    /// Create starter configuration files.
    Init(InitArgs),
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Directory with configuration documents.
    #[arg(long)]
    configs: Option<PathBuf>,
    /// How environment documents are reconciled.
    #[arg(long)]
    mode: Option<CliMode>,
    /// Fail when a key has different kinds across documents.
    #[arg(long)]
    strict_kinds: bool,
}

#[derive(Debug, Args)]
struct SchemaArgs {
    #[command(flatten)]
    build: BuildArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FlagsArgs {
    /// Flag declaration file (default: <configs>/flags.toml).
    #[arg(long)]
    file: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[command(flatten)]
    build: BuildArgs,
}

#[derive(Debug, Args)]
struct InitArgs {
    /// Directory to create the starter files in.
    #[arg(long)]
    configs: Option<PathBuf>,
}

/// Everything the code generator consumes.
#[derive(Debug, Serialize)]
struct SchemaOutput<'a> {
    #[serde(flatten)]
    schema: &'a Schema,
    flags: &'a [FlagDef],
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = load_project(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Schema(args) => run_schema(config, args),
        Command::Flags(args) => run_flags(config, args),
        Command::Check(args) => run_check(config, args),
        Command::Init(args) => run_init(config, args),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "configgen=warn",
        1 => "configgen=info",
        2 => "configgen=debug",
        _ => "configgen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn load_project(path: Option<&Path>) -> Result<ProjectConfig, String> {
    let config = match path {
        Some(path) => ProjectConfig::load(path),
        None => ProjectConfig::load_or_default(DEFAULT_CONFIG_FILE),
    }
    .map_err(|e| e.to_string())?;
    debug!(?config, "resolved project configuration");
    Ok(config)
}

impl BuildArgs {
    /// Applies command-line overrides on top of the project configuration.
    fn apply(&self, mut config: ProjectConfig) -> ProjectConfig {
        if let Some(dir) = &self.configs {
            config.configs_dir = dir.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        config.strict_kinds |= self.strict_kinds;
        config
    }
}

fn build_schema(config: &ProjectConfig) -> Result<(DocumentSet, Schema), String> {
    let set = DocumentSet::discover(config).map_err(|e| e.to_string())?;
    let schema = set.build(config).map_err(|e| e.to_string())?;
    Ok((set, schema))
}

fn run_schema(config: ProjectConfig, args: SchemaArgs) -> Result<(), String> {
    let config = args.build.apply(config);
    let (_, schema) = build_schema(&config)?;
    let flags = load_flags(config.flags_path()).map_err(|e| e.to_string())?;

    let output = SchemaOutput {
        schema: &schema,
        flags: &flags,
    };
    let raw = render(&output, args.format)?;

    match args.output {
        Some(path) => {
            write_output(&path, &raw)?;
            println!(
                "Wrote schema with {} top-level field(s) and {} flag(s) to '{}'.",
                schema.len(),
                flags.len(),
                path.display()
            );
        }
        None => println!("{raw}"),
    }
    Ok(())
}

fn run_flags(config: ProjectConfig, args: FlagsArgs) -> Result<(), String> {
    let path = args.file.unwrap_or_else(|| config.flags_path());
    if !path.exists() {
        return Err(format!("flag file '{}' does not exist", path.display()));
    }
    let flags = load_flags(&path).map_err(|e| e.to_string())?;
    println!("{}", render(&flags, args.format)?);
    Ok(())
}

fn run_check(config: ProjectConfig, args: CheckArgs) -> Result<(), String> {
    let config = args.build.apply(config);
    let (set, schema) = build_schema(&config)?;
    let flags = load_flags(config.flags_path()).map_err(|e| e.to_string())?;

    let environments: Vec<&str> = set.environment_names().collect();
    println!("Check passed:");
    println!("  Configs: {}", set.source().display());
    println!(
        "  Constants: {}",
        set.constants.as_ref().map_or("none", |d| d.name.as_str())
    );
    println!(
        "  Environments: {} ({})",
        environments.len(),
        environments.join(", ")
    );
    println!("  Mode: {}", config.mode);
    println!("  Top-level fields: {}", schema.len());
    println!("  Flags: {}", flags.len());

    if !config.strict_kinds {
        let trees = set
            .environments
            .values()
            .map(|doc| infer_document(&doc.value, &doc.comments))
            .collect::<Result<Vec<Fields>, _>>()
            .map_err(|e| e.to_string())?;
        let conflicts = kind_conflicts(&trees);
        if !conflicts.is_empty() {
            eprintln!(
                "\n{} kind conflict(s) {}:",
                conflicts.len(),
                conflict_resolution(config.mode)
            );
            for conflict in &conflicts {
                eprintln!("  {conflict}");
            }
        }
    }
    Ok(())
}

/// How `mode` settles a path whose kind differs between environments.
fn conflict_resolution(mode: ReconcileMode) -> &'static str {
    match mode {
        ReconcileMode::Intersect => "dropped from the schema",
        ReconcileMode::Union => "resolved by first occurrence",
        ReconcileMode::Merge => "resolved by the last layer",
    }
}

fn run_init(config: ProjectConfig, args: InitArgs) -> Result<(), String> {
    let dir = args.configs.unwrap_or(config.configs_dir);
    println!("Initializing config files in '{}'...", dir.display());

    let outcomes = init_configs(&dir).map_err(|e| e.to_string())?;
    for (path, outcome) in &outcomes {
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        match outcome {
            InitOutcome::Created => println!("  created: {name}"),
            InitOutcome::Skipped => println!("  skip: {name} (already exists)"),
        }
    }
    info!(dir = %dir.display(), "initialized");
    println!("Done! Edit the files and run `configgen schema` to build the schema.");
    Ok(())
}

fn render<T: Serialize + ?Sized>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

fn write_output(path: &Path, raw: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(path, raw).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}
