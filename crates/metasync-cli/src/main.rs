mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{AppConfig, ConfigError};
use logging::{LogFormat, init_logging};
use metasync_core::{
    DiffSummary, Error as CoreError, Snapshot, diff, load_snapshot, redact_dsn, save_snapshot,
    validate_snapshot,
};
use metasync_generate::{GenerateError, generate_bindings};
use metasync_introspect::{CollectOptions, collect_snapshot};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generate error: {0}")]
    Generate(#[from] GenerateError),
    #[error("cannot render diff: {0}")]
    Render(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "metasync", version, about = "Schema snapshot and drift tool")]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect a snapshot from every configured database.
    Snapshot(SnapshotArgs),
    /// Compare two snapshot files.
    Diff(DiffArgs),
    /// Emit Rust bindings for every table of a snapshot.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    #[arg(long, default_value = "configs/dev.toml")]
    config: PathBuf,
    /// Where to write the snapshot.
    #[arg(long, default_value = "snapshots/dev-latest.json")]
    new: PathBuf,
    /// Schema name(s) to include.
    #[arg(long, value_name = "SCHEMA")]
    schema: Vec<String>,
    /// Include system schemas such as pg_catalog.
    #[arg(long, default_value_t = false)]
    include_system_schemas: bool,
    /// Skip index collection.
    #[arg(long, default_value_t = false)]
    skip_indexes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DiffFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
struct DiffArgs {
    #[arg(long)]
    old: PathBuf,
    #[arg(long, default_value = "snapshots/dev-latest.json")]
    new: PathBuf,
    #[arg(long, value_enum, default_value_t = DiffFormat::Text)]
    format: DiffFormat,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long, default_value = "snapshots/dev-latest.json")]
    new: PathBuf,
    #[arg(long, default_value = "generated_models")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let run_id = Uuid::new_v4().to_string();
    let timer = Instant::now();

    let (command, result) = match cli.command {
        Command::Snapshot(args) => {
            tracing::info!(event = "run_started", run_id = %run_id, command = "snapshot");
            ("snapshot", run_snapshot(args).await)
        }
        Command::Diff(args) => {
            tracing::info!(event = "run_started", run_id = %run_id, command = "diff");
            ("diff", run_diff(args))
        }
        Command::Generate(args) => {
            tracing::info!(event = "run_started", run_id = %run_id, command = "generate");
            ("generate", run_generate(args))
        }
    };

    let duration_ms = timer.elapsed().as_millis();
    match &result {
        Ok(()) => tracing::info!(
            event = "run_finished",
            run_id = %run_id,
            command,
            status = "success",
            duration_ms,
        ),
        Err(err) => tracing::error!(
            event = "run_finished",
            run_id = %run_id,
            command,
            status = "failed",
            duration_ms,
            error = %err,
        ),
    }
    result
}

async fn run_snapshot(args: SnapshotArgs) -> Result<(), CliError> {
    let SnapshotArgs {
        config,
        new,
        schema,
        include_system_schemas,
        skip_indexes,
    } = args;

    let app_config = AppConfig::load(&config)?;
    app_config.validate()?;
    let dsns = app_config.dsn_map();
    for (name, dsn) in &dsns {
        tracing::info!(event = "database_configured", database = %name, dsn = %redact_dsn(dsn));
    }

    let options = CollectOptions {
        include_system_schemas,
        include_indexes: !skip_indexes,
        schemas: if schema.is_empty() { None } else { Some(schema) },
        ..CollectOptions::default()
    };

    tracing::info!(event = "collection_started", env = %app_config.env, databases = dsns.len());
    let snapshot = collect_snapshot(&app_config.env, &dsns, &options).await?;
    report_validation(&snapshot);

    save_snapshot(&new, &snapshot)?;
    tracing::info!(
        event = "snapshot_saved",
        path = %new.display(),
        databases = snapshot.databases.len(),
        tables = snapshot.table_count(),
    );
    Ok(())
}

fn run_diff(args: DiffArgs) -> Result<(), CliError> {
    let old = load_checked(&args.old)?;
    let new = load_checked(&args.new)?;

    let changes = diff(&old, &new);
    match args.format {
        DiffFormat::Text => {
            for change in &changes {
                println!("{change}");
            }
        }
        DiffFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&changes)?);
        }
    }

    let summary = DiffSummary::from_changes(&changes);
    tracing::info!(
        event = "diff_finished",
        old = %args.old.display(),
        new = %args.new.display(),
        added = summary.added,
        removed = summary.removed,
        changed = summary.changed,
    );
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let snapshot = load_checked(&args.new)?;
    generate_bindings(&snapshot, &args.out)?;
    Ok(())
}

fn load_checked(path: &Path) -> Result<Snapshot, CliError> {
    let snapshot = load_snapshot(path)?;
    tracing::info!(
        event = "snapshot_loaded",
        path = %path.display(),
        env = %snapshot.env,
        timestamp = %snapshot.timestamp,
    );
    report_validation(&snapshot);
    Ok(snapshot)
}

fn report_validation(snapshot: &Snapshot) {
    let report = validate_snapshot(snapshot);
    for issue in &report.issues {
        tracing::warn!(
            event = "validation_issue",
            code = issue.code,
            path = %issue.path,
            detail = %issue.message,
        );
    }
}
