//! Repository validator: rule-based fact extraction for health scoring.
//! No network and no writes; the binary prints one JSON object to stdout.
//! Can also be called as a library.

pub mod content;
pub mod error;
pub mod process;
pub mod recommend;
pub mod schema;
pub mod structure;
pub mod types;

use std::path::Path;
use tracing::debug;

pub use error::ValidatorError;
pub use types::{ComplianceLevel, HealthMetrics, SchemaDocument, ValidationResult, Violation};

/// Validate the repository at `repo` against its type's schema.
///
/// `repo_type` overrides detection from the manifest or directory layout.
pub fn validate(
  repo: &Path,
  doc: &SchemaDocument,
  repo_type: Option<&str>,
) -> Result<ValidationResult, ValidatorError> {
  if !repo.is_dir() {
    return Err(ValidatorError::RepoNotFound(repo.display().to_string()));
  }

  let repository_type = match repo_type {
    Some(t) => t.to_string(),
    None => schema::detect_type(repo),
  };
  let repo_schema = doc
    .repository_schemas
    .get(&repository_type)
    .ok_or_else(|| ValidatorError::UnknownType(repository_type.clone()))?;

  let model_pattern = structure::model_file_pattern(repo_schema)?;
  let structural = structure::validate(repo, repo_schema, &model_pattern);
  let content = content::validate(repo, repo_schema);
  let process = process::validate_process(repo);
  let security = process::validate_security(repo);

  let w = doc.validation_rules.weights();
  let score = structural.score * w.structural
    + content.score * w.content
    + process.score * w.process
    + security.score * w.security;

  let mut violations: Vec<Violation> = Vec::new();
  for outcome in [&structural, &content, &process, &security] {
    violations.extend(outcome.violations.iter().cloned());
  }

  let compliance_level = recommend::compliance_level(score, violations.len());
  let recommendations = recommend::recommendations(&violations);

  let repo_name = repo
    .canonicalize()
    .ok()
    .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
    .unwrap_or_else(|| repo.display().to_string());

  debug!(
    repo = %repo_name,
    repository_type = %repository_type,
    score,
    violations = violations.len(),
    "validated repository"
  );

  Ok(ValidationResult {
    repo_name,
    repository_type,
    score,
    compliance_level,
    violations: violations.iter().map(ToString::to_string).collect(),
    recommendations,
    health_metrics: HealthMetrics {
      structural_health: structural.score,
      content_health: content.score,
      process_health: process.score,
      security_health: security.score,
      overall_health: score,
    },
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  fn lab_schema() -> SchemaDocument {
    schema::parse(
      r#"{
        "repository_schemas": {
          "lab": {"required_directories": ["experiments"], "required_files": ["README.md"]}
        }
      }"#,
    )
    .unwrap()
  }

  #[test]
  fn missing_repo_is_an_error() {
    let err = validate(Path::new("/definitely/not/here"), &lab_schema(), None).unwrap_err();
    assert!(matches!(err, ValidatorError::RepoNotFound(_)));
  }

  #[test]
  fn unknown_type_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = validate(dir.path(), &lab_schema(), Some("framework")).unwrap_err();
    assert!(matches!(err, ValidatorError::UnknownType(t) if t == "framework"));
  }

  #[test]
  fn weighted_score_and_metrics() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("experiments")).unwrap();

    let out = validate(dir.path(), &lab_schema(), None).unwrap();
    assert_eq!(out.repository_type, "lab");
    // structural 1/2, content 1.0 (nothing to check), process 0, security 0
    assert!((out.health_metrics.structural_health - 0.5).abs() < 1e-12);
    assert_eq!(out.health_metrics.content_health, 1.0);
    assert!((out.score - (0.5 * 0.3 + 0.3)).abs() < 1e-12);
    assert_eq!(out.health_metrics.overall_health, out.score);
    assert_eq!(out.compliance_level, ComplianceLevel::Documented);
    assert_eq!(out.violations[0], "Missing required file: README.md");
    assert_eq!(out.violations.len(), 6);
  }
}
