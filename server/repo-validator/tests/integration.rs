//! Integration tests: fixture repositories on disk, validator output into the engine.

use repo_validator::{schema, validate, ComplianceLevel, SchemaDocument};
use std::fs;
use std::path::Path;

const SCHEMA: &str = r#"{
  "repository_schemas": {
    "framework": {
      "required_directories": ["core", "composite", "docs"],
      "required_files": ["README.md", "fcm.manifest.json"],
      "content_requirements": {"readme_min_length": 40}
    },
    "lab": {
      "required_directories": ["experiments"],
      "required_files": ["README.md"]
    }
  },
  "validation_rules": {
    "structural": {"weight": 0.4},
    "content": {"weight": 0.2}
  }
}"#;

fn doc() -> SchemaDocument {
  schema::parse(SCHEMA).unwrap()
}

fn write(root: &Path, rel: &str, body: &str) {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, body).unwrap();
}

fn exemplary_framework(root: &Path) {
  for d in ["core", "composite", "docs", "tools", "scripts"] {
    fs::create_dir_all(root.join(d)).unwrap();
  }
  write(
    root,
    "README.md",
    "# Framework\n\nA description long enough to pass the schema minimum.\n",
  );
  write(
    root,
    "fcm.manifest.json",
    r#"{"type": "repo", "category": "framework", "name": "fw", "version": "1.0.0"}"#,
  );
  write(
    root,
    "core/fcm.base-model.md",
    "**Model ID**: base\n\n## Layer 1: Axioms\n",
  );
  write(root, ".github/workflows/ci.yml", "on: push\n");
  write(root, ".github/dependabot.yml", "version: 2\n");
  write(root, "SECURITY.md", "Report issues privately.\n");
}

#[test]
fn exemplary_repository_scores_full() {
  let dir = tempfile::tempdir().unwrap();
  exemplary_framework(dir.path());

  let out = validate(dir.path(), &doc(), None).unwrap();
  assert_eq!(out.repository_type, "framework");
  assert!(out.violations.is_empty(), "{:?}", out.violations);
  assert!(out.recommendations.is_empty());
  assert!((out.score - 1.0).abs() < 1e-12);
  assert_eq!(out.compliance_level, ComplianceLevel::Exemplary);
}

#[test]
fn custom_weights_apply() {
  let dir = tempfile::tempdir().unwrap();
  exemplary_framework(dir.path());
  fs::remove_file(dir.path().join(".github/dependabot.yml")).unwrap();
  fs::remove_file(dir.path().join("SECURITY.md")).unwrap();

  let out = validate(dir.path(), &doc(), None).unwrap();
  // structural 0.4 + content 0.2 + process 0.2 + security 0 * 0.2
  assert!((out.score - 0.8).abs() < 1e-12);
  assert_eq!(out.compliance_level, ComplianceLevel::Secure);
  assert_eq!(
    out.violations,
    vec!["No security policy found", "No dependency scanning configured"]
  );
}

#[test]
fn broken_repository_lists_fixes() {
  let dir = tempfile::tempdir().unwrap();
  fs::create_dir(dir.path().join("core")).unwrap();
  fs::create_dir(dir.path().join("composite")).unwrap();
  write(dir.path(), "README.md", "short");
  write(dir.path(), "core/fcm.Bad_Model.md", "nothing");

  let out = validate(dir.path(), &doc(), None).unwrap();
  assert_eq!(out.repository_type, "framework");
  assert!(out
    .violations
    .contains(&"Model file fcm.Bad_Model.md doesn't follow FCM naming convention".to_string()));
  assert_eq!(
    out.recommendations,
    vec![
      "Create directory: mkdir -p docs",
      "Create file: touch fcm.manifest.json",
      "Fix naming: Use kebab-case for files, lowercase for directories",
      "Improve README.md: Add title, description, and usage sections",
    ]
  );
  assert!(out.score < 0.4);
}

#[test]
fn output_json_feeds_the_health_engine() {
  let dir = tempfile::tempdir().unwrap();
  fs::create_dir(dir.path().join("experiments")).unwrap();
  write(dir.path(), "README.md", "# Lab\n");

  let out = validate(dir.path(), &doc(), Some("lab")).unwrap();
  let json = serde_json::to_value(&out).unwrap();
  assert_eq!(json["compliance_level"], out_level_name(out.compliance_level));
  assert!(json["health_metrics"]["overall_health"].is_number());

  let request: health_engine::ScoreRequest = serde_json::from_value(json).unwrap();
  assert_eq!(request.violations.len(), out.violations.len());
  assert!((request.health_metrics.structural - 1.0).abs() < 1e-12);

  let score = health_engine::Engine::with_defaults().score(&request.health_metrics, &[]);
  assert!((0.0..=1.0).contains(&score.overall_score));
}

fn out_level_name(level: ComplianceLevel) -> &'static str {
  match level {
    ComplianceLevel::Basic => "basic",
    ComplianceLevel::Structured => "structured",
    ComplianceLevel::Documented => "documented",
    ComplianceLevel::Tested => "tested",
    ComplianceLevel::Secure => "secure",
    ComplianceLevel::Exemplary => "exemplary",
  }
}
