//! Structural checks: required paths and naming conventions.

use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::ValidatorError;
use crate::types::{CheckOutcome, RepositorySchema, Violation};

pub const DEFAULT_MODEL_FILE_PATTERN: &str = r"^fcm\.[a-z]+(-[a-z]+)*\.md$";

fn is_vcs_dir(entry: &DirEntry) -> bool {
  entry.file_type().is_dir() && entry.file_name() == ".git"
}

/// Walk the tree below `repo`, skipping `.git`. Unreadable entries are skipped.
fn walk(repo: &Path) -> impl Iterator<Item = DirEntry> {
  WalkDir::new(repo)
    .min_depth(1)
    .into_iter()
    .filter_entry(|e| !is_vcs_dir(e))
    .filter_map(Result::ok)
}

/// Files anywhere in the tree whose name looks like `fcm.*.md`.
pub fn model_files(repo: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = walk(repo)
    .filter(|e| e.file_type().is_file())
    .filter(|e| {
      let name = e.file_name().to_string_lossy();
      name.starts_with("fcm.") && name.ends_with(".md")
    })
    .map(|e| e.into_path())
    .collect();
  files.sort();
  files
}

/// Model file pattern from the schema, or the default.
pub fn model_file_pattern(schema: &RepositorySchema) -> Result<Regex, ValidatorError> {
  let pattern = schema
    .naming_conventions
    .get("model_files")
    .map(String::as_str)
    .unwrap_or(DEFAULT_MODEL_FILE_PATTERN);
  Regex::new(pattern)
    .map_err(|e| ValidatorError::schema(format!("naming_conventions.model_files: {}", e)))
}

/// Naming violations. These never change the structural score.
pub fn check_naming(repo: &Path, model_pattern: &Regex) -> Vec<Violation> {
  let mut violations = Vec::new();

  for file in model_files(repo) {
    let name = file
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    if !model_pattern.is_match(&name) {
      violations.push(Violation::ModelFileNaming(name));
    }
  }

  let mut dirs: Vec<String> = walk(repo)
    .filter(|e| e.file_type().is_dir())
    .map(|e| e.file_name().to_string_lossy().into_owned())
    .filter(|name| *name != name.to_lowercase())
    .collect();
  dirs.sort();
  violations.extend(dirs.into_iter().map(Violation::DirectoryNotLowercase));

  violations
}

/// Fraction of required directories and files present, plus naming violations.
pub fn validate(
  repo: &Path,
  schema: &RepositorySchema,
  model_pattern: &Regex,
) -> CheckOutcome {
  let mut passed = 0;
  let mut total = 0;
  let mut violations = Vec::new();

  for dir in &schema.required_directories {
    total += 1;
    if repo.join(dir).is_dir() {
      passed += 1;
    } else {
      violations.push(Violation::MissingDirectory(dir.clone()));
    }
  }

  for file in &schema.required_files {
    total += 1;
    if repo.join(file).is_file() {
      passed += 1;
    } else {
      violations.push(Violation::MissingFile(file.clone()));
    }
  }

  violations.extend(check_naming(repo, model_pattern));
  CheckOutcome::from_counts(passed, total, violations)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  fn schema(dirs: &[&str], files: &[&str]) -> RepositorySchema {
    RepositorySchema {
      required_directories: dirs.iter().map(|s| s.to_string()).collect(),
      required_files: files.iter().map(|s| s.to_string()).collect(),
      ..Default::default()
    }
  }

  fn default_pattern() -> Regex {
    Regex::new(DEFAULT_MODEL_FILE_PATTERN).unwrap()
  }

  #[test]
  fn counts_present_paths() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("README.md"), "# hi").unwrap();

    let out = validate(
      dir.path(),
      &schema(&["docs", "models"], &["README.md", "LICENSE"]),
      &default_pattern(),
    );
    assert!((out.score - 0.5).abs() < 1e-12);
    assert_eq!(
      out.violations,
      vec![
        Violation::MissingDirectory("models".into()),
        Violation::MissingFile("LICENSE".into()),
      ]
    );
  }

  #[test]
  fn nothing_required_scores_full() {
    let dir = tempfile::tempdir().unwrap();
    let out = validate(dir.path(), &schema(&[], &[]), &default_pattern());
    assert_eq!(out.score, 1.0);
  }

  #[test]
  fn file_in_place_of_directory_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("docs"), "not a dir").unwrap();
    let out = validate(dir.path(), &schema(&["docs"], &[]), &default_pattern());
    assert_eq!(out.score, 0.0);
  }

  #[test]
  fn naming_flags_bad_model_names_and_uppercase_dirs() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("Models/inner")).unwrap();
    fs::write(dir.path().join("Models/fcm.good-name.md"), "").unwrap();
    fs::write(dir.path().join("Models/fcm.Bad_Name.md"), "").unwrap();

    let violations = check_naming(dir.path(), &default_pattern());
    assert_eq!(
      violations,
      vec![
        Violation::ModelFileNaming("fcm.Bad_Name.md".into()),
        Violation::DirectoryNotLowercase("Models".into()),
      ]
    );
  }

  #[test]
  fn git_directory_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".git/Refs")).unwrap();
    assert!(check_naming(dir.path(), &default_pattern()).is_empty());
  }

  #[test]
  fn schema_can_override_model_pattern() {
    let mut s = schema(&[], &[]);
    s.naming_conventions
      .insert("model_files".into(), r"^fcm\..+\.md$".into());
    let re = model_file_pattern(&s).unwrap();
    assert!(re.is_match("fcm.Anything_Goes.md"));
  }

  #[test]
  fn invalid_override_is_schema_error() {
    let mut s = schema(&[], &[]);
    s.naming_conventions.insert("model_files".into(), "(".into());
    assert!(matches!(model_file_pattern(&s), Err(ValidatorError::Schema(_))));
  }
}
