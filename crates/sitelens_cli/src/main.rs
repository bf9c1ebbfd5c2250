//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `sitelens_core` linkage with a deterministic ping/version line.
//! - Optionally summarize a JSON snapshot: `sitelens_cli <projects|timelines> <file.json>`.
//! - File logging starts only when `--log-dir` / `SITELENS_LOG_DIR` names an absolute directory.
//!
//! # Invariants
//! - Config, snapshot, and render failures go to stderr with a non-zero exit.

use clap::{Parser, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sitelens_core::{
    init_logging, run_query, ChartData, ConfigError, Criteria, EngineConfig, JsonSnapshotSource,
    LogLevel, ProjectRecord, QueryParams, QueryRecord, RecordSource, SourceError, Summary,
    TimelineRecord,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "sitelens_cli", version, about = "Summarize SiteLens dashboard snapshots")]
struct Cli {
    /// Record kind held by the snapshot.
    #[arg(value_enum, requires = "snapshot")]
    kind: Option<RecordKind>,

    /// JSON snapshot: a bare array or a `data`/`items`/`results` envelope.
    snapshot: Option<PathBuf>,

    /// Engine config file; `SITELENS_*` overrides still apply on top.
    #[arg(long, env = "SITELENS_CONFIG")]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files.
    #[arg(long, env = "SITELENS_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "SITELENS_LOG_LEVEL")]
    log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RecordKind {
    Projects,
    Timelines,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot read snapshot: {0}")]
    Source(#[from] SourceError),
    #[error("failed to render summary: {0}")]
    Render(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a Summary,
    charts: &'a ChartData,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    println!("sitelens_core ping={}", sitelens_core::ping());
    println!("sitelens_core version={}", sitelens_core::core_version());

    let (Some(kind), Some(snapshot)) = (cli.kind, cli.snapshot.as_deref()) else {
        return ExitCode::SUCCESS;
    };

    start_logging(&cli);

    match summarize_snapshot(kind, snapshot, cli.config.as_deref()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(cli: &Cli) {
    let Some(log_dir) = cli.log_dir.as_deref() else {
        return;
    };
    let level = cli.log_level.unwrap_or_else(LogLevel::default_for_build);
    if let Err(err) = init_logging(level.as_str(), log_dir) {
        eprintln!("logging disabled: {err}");
    }
}

fn summarize_snapshot(
    kind: RecordKind,
    snapshot: &Path,
    config: Option<&Path>,
) -> Result<String, CliError> {
    let config = EngineConfig::resolve(config, |name| std::env::var(name).ok())?;
    let source = JsonSnapshotSource::from_path(snapshot);
    match kind {
        RecordKind::Projects => render::<ProjectRecord>(&source, &config),
        RecordKind::Timelines => render::<TimelineRecord>(&source, &config),
    }
}

fn render<R>(source: &JsonSnapshotSource, config: &EngineConfig) -> Result<String, CliError>
where
    R: QueryRecord + DeserializeOwned,
{
    let records: Vec<R> = source.fetch()?;
    let outcome = run_query(&records, &QueryParams::from_config(Criteria::new(), config));
    let report = Report {
        summary: &outcome.summary,
        charts: &outcome.charts,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
