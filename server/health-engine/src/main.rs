//! Binary entrypoint: read one scoring request from stdin, write the score to stdout.
//!
//! The request is repo-validator's JSON output (or any object with a
//! `health_metrics` map). With `--history` the run reads prior snapshots from,
//! and appends one snapshot to, a JSON history file.
//!
//! Exit codes: 0 scored (and persisted, if requested); 1 invalid input or
//! configuration; 2 scored but the history store failed. The score is written
//! to stdout in both 0 and 2.

use clap::{Parser, ValueEnum};
use health_engine::recommend::dedupe_recommendations;
use health_engine::report;
use health_engine::types::ErrorOutput;
use health_engine::{Config, Engine, EngineError, JsonFileStore, ScoreRequest};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
  Json,
  Summary,
}

#[derive(Debug, Parser)]
#[command(name = "health-engine", about = "Score repository health from validator output")]
struct Args {
  /// Metric catalog JSON. Defaults to the built-in catalog.
  #[arg(long)]
  config: Option<PathBuf>,

  /// JSON history file to read trends from and append this run to.
  #[arg(long)]
  history: Option<PathBuf>,

  /// Repository name. Overrides `repo_name` in the request.
  #[arg(long)]
  repo: Option<String>,

  /// Drop repeated recommendations, keeping the first occurrence.
  #[arg(long)]
  dedupe: bool,

  /// Output format.
  #[arg(long, value_enum, default_value_t = Format::Json)]
  format: Format,

  /// Pretty-print the output JSON.
  #[arg(long)]
  pretty: bool,
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();
}

fn main() {
  init_tracing();
  let args = Args::parse();

  match run_binary(&args) {
    Ok(persisted) => {
      if !persisted {
        std::process::exit(2);
      }
    }
    Err(e) => {
      let err = match &e {
        EngineError::Validation { field, reason } => {
          ErrorOutput::new(reason.clone()).with_field(field.clone())
        }
        _ => ErrorOutput::new(e.to_string()),
      };
      let stdout = io::stdout();
      let mut out = stdout.lock();
      let _ = serde_json::to_writer(&mut out, &err);
      let _ = writeln!(out);
      let _ = writeln!(io::stderr(), "health-engine error: {}", e);
      std::process::exit(1);
    }
  }
}

/// Returns whether the run's snapshot was persisted (true when no store was requested).
fn run_binary(args: &Args) -> Result<bool, EngineError> {
  let config = match &args.config {
    Some(path) => Config::load(path)?,
    None => Config::default(),
  };
  let engine = Engine::new(config)?;

  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;
  if raw.trim().is_empty() {
    return Err(EngineError::validation("stdin", "expected one JSON scoring request"));
  }
  let request: ScoreRequest = serde_json::from_str(raw.trim())?;

  let (mut score, persisted) = match &args.history {
    Some(path) => {
      let repo = args
        .repo
        .clone()
        .or_else(|| request.repo_name.clone())
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| EngineError::validation("repo_name", "required when --history is set"))?;
      let mut store = JsonFileStore::new(path).with_legacy_repo(repo.clone());
      let outcome = engine.score_and_record(
        &repo,
        &request.health_metrics,
        request.violations.len() as u64,
        &mut store,
      );
      if let Some(e) = &outcome.history_error {
        let _ = writeln!(io::stderr(), "health-engine: history not read: {}", e);
      }
      if let Some(e) = &outcome.persist_error {
        let _ = writeln!(io::stderr(), "health-engine: history not saved: {}", e);
      }
      let persisted = outcome.persisted();
      (outcome.score, persisted)
    }
    None => (engine.score(&request.health_metrics, &[]), true),
  };

  if args.dedupe {
    score.recommendations = dedupe_recommendations(&score.recommendations);
  }

  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  match args.format {
    Format::Summary => write!(out, "{}", report::summary(&score))?,
    Format::Json if args.pretty => {
      serde_json::to_writer_pretty(&mut out, &score)?;
      writeln!(out)?;
    }
    Format::Json => {
      serde_json::to_writer(&mut out, &score)?;
      writeln!(out)?;
    }
  }
  out.flush()?;

  Ok(persisted)
}
