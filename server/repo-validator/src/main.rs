//! Binary entrypoint: validate one repository, write one JSON object to stdout.
//!
//! `--text` prints a human-readable report instead. Exit code 1 on error.

use clap::Parser;
use repo_validator::{schema, validate, ValidationResult, ValidatorError};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "repo-validator", about = "Validate a repository against its schema")]
struct Args {
  /// Repository to validate.
  repo_path: PathBuf,

  /// Repository type. Detected from the manifest or layout when omitted.
  #[arg(long = "type")]
  repo_type: Option<String>,

  /// Schema document.
  #[arg(long, default_value = "schemas/fcm-repository.json")]
  schema: PathBuf,

  /// Human-readable report instead of JSON.
  #[arg(long)]
  text: bool,

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
  if let Err(e) = run_binary(&args) {
    let _ = writeln!(io::stderr(), "repo-validator error: {}", e);
    std::process::exit(1);
  }
}

fn run_binary(args: &Args) -> Result<(), ValidatorError> {
  let doc = schema::load(&args.schema)?;
  let result = validate(&args.repo_path, &doc, args.repo_type.as_deref())?;

  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  if args.text {
    write_report(&mut out, &result)?;
  } else if args.pretty {
    serde_json::to_writer_pretty(&mut out, &result)?;
    writeln!(out)?;
  } else {
    serde_json::to_writer(&mut out, &result)?;
    writeln!(out)?;
  }
  out.flush()?;
  Ok(())
}

fn write_report(out: &mut impl Write, result: &ValidationResult) -> io::Result<()> {
  writeln!(out, "Repository: {} ({})", result.repo_name, result.repository_type)?;
  writeln!(out, "Overall Score: {:.2}", result.score)?;
  writeln!(out, "Compliance Level: {:?}", result.compliance_level)?;
  if !result.violations.is_empty() {
    writeln!(out, "\nViolations:")?;
    for v in &result.violations {
      writeln!(out, "  - {}", v)?;
    }
  }
  if !result.recommendations.is_empty() {
    writeln!(out, "\nRecommendations:")?;
    for r in &result.recommendations {
      writeln!(out, "  - {}", r)?;
    }
  }
  let m = &result.health_metrics;
  writeln!(out, "\nHealth Metrics:")?;
  for (name, value) in [
    ("structural_health", m.structural_health),
    ("content_health", m.content_health),
    ("process_health", m.process_health),
    ("security_health", m.security_health),
    ("overall_health", m.overall_health),
  ] {
    writeln!(out, "  {}: {:.2}", name, value)?;
  }
  Ok(())
}
