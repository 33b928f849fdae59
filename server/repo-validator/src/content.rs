//! Content checks: README, manifest and model files.

use std::fs;
use std::path::Path;

use crate::schema::MANIFEST_FILE;
use crate::structure::model_files;
use crate::types::{CheckOutcome, RepositorySchema, Violation};

pub const DEFAULT_README_MIN_LENGTH: usize = 100;

pub const MANIFEST_REQUIRED_FIELDS: [&str; 4] = ["type", "category", "name", "version"];

pub const VALID_CATEGORIES: [&str; 7] = [
  "framework",
  "systems",
  "domains",
  "works",
  "projects",
  "lab",
  "personal",
];

/// Running pass/total tally for one category.
#[derive(Debug, Default)]
struct Tally {
  passed: usize,
  total: usize,
  violations: Vec<Violation>,
}

impl Tally {
  fn check(&mut self, ok: bool, violation: impl FnOnce() -> Violation) {
    self.total += 1;
    if ok {
      self.passed += 1;
    } else {
      self.violations.push(violation());
    }
  }

  fn fail(&mut self, violation: Violation) {
    self.total += 1;
    self.violations.push(violation);
  }

  fn finish(self) -> CheckOutcome {
    CheckOutcome::from_counts(self.passed, self.total, self.violations)
  }
}

fn check_readme(repo: &Path, min_length: usize, tally: &mut Tally) {
  let path = repo.join("README.md");
  if !path.is_file() {
    return;
  }
  match fs::read_to_string(&path) {
    Ok(text) => {
      tally.check(text.chars().count() >= min_length, || {
        Violation::ReadmeTooShort(min_length)
      });
      tally.check(text.contains('#'), || Violation::ReadmeMissingSections);
    }
    Err(e) => tally.fail(Violation::ReadmeUnreadable(e.to_string())),
  }
}

fn check_manifest(repo: &Path, tally: &mut Tally) {
  let path = repo.join(MANIFEST_FILE);
  if !path.is_file() {
    return;
  }
  let raw = match fs::read_to_string(&path) {
    Ok(raw) => raw,
    Err(e) => return tally.fail(Violation::ManifestUnreadable(e.to_string())),
  };
  let manifest: serde_json::Value = match serde_json::from_str(&raw) {
    Ok(v) => v,
    Err(e) => return tally.fail(Violation::ManifestInvalidJson(e.to_string())),
  };

  for field in MANIFEST_REQUIRED_FIELDS {
    tally.check(manifest.get(field).is_some(), || {
      Violation::ManifestMissingField(field.to_string())
    });
  }

  if let Some(category) = manifest.get("category") {
    let name = match category {
      serde_json::Value::String(s) => s.clone(),
      other => other.to_string(),
    };
    tally.check(VALID_CATEGORIES.contains(&name.as_str()), || {
      Violation::ManifestInvalidCategory(name.clone())
    });
  }
}

fn check_model_files(repo: &Path, tally: &mut Tally) {
  for path in model_files(repo) {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    match fs::read_to_string(&path) {
      Ok(text) => {
        let has_id = text.contains("**Model ID**:") || text.contains("model_id:");
        tally.check(has_id, || Violation::ModelMissingId(name.clone()));
        tally.check(text.contains("## Layer 1:"), || {
          Violation::ModelMissingLayers(name.clone())
        });
      }
      Err(e) => tally.fail(Violation::ModelUnreadable {
        file: name,
        reason: e.to_string(),
      }),
    }
  }
}

/// README length and sections, manifest fields, model file structure.
pub fn validate(repo: &Path, schema: &RepositorySchema) -> CheckOutcome {
  let min_length = schema
    .content_requirements
    .readme_min_length
    .unwrap_or(DEFAULT_README_MIN_LENGTH);

  let mut tally = Tally::default();
  check_readme(repo, min_length, &mut tally);
  check_manifest(repo, &mut tally);
  check_model_files(repo, &mut tally);
  tally.finish()
}
