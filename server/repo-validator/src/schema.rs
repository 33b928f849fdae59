//! Schema loading and repository type detection.

use std::fs;
use std::path::Path;

use crate::error::ValidatorError;
use crate::types::SchemaDocument;

pub const MANIFEST_FILE: &str = "fcm.manifest.json";

/// Parse a schema document and reject one with no repository types.
pub fn parse(raw: &str) -> Result<SchemaDocument, ValidatorError> {
  let doc: SchemaDocument = serde_json::from_str(raw)?;
  if doc.repository_schemas.is_empty() {
    return Err(ValidatorError::schema("repository_schemas must not be empty"));
  }
  let w = doc.validation_rules.weights();
  for (name, weight) in [
    ("structural", w.structural),
    ("content", w.content),
    ("process", w.process),
    ("security", w.security),
  ] {
    if !(0.0..=1.0).contains(&weight) {
      return Err(ValidatorError::schema(format!(
        "validation_rules.{}.weight must be in [0, 1]",
        name
      )));
    }
  }
  Ok(doc)
}

pub fn load(path: &Path) -> Result<SchemaDocument, ValidatorError> {
  let raw = fs::read_to_string(path)?;
  parse(&raw)
}

/// Repository type: manifest `category` first, then directory layout.
pub fn detect_type(repo: &Path) -> String {
  let manifest = repo.join(MANIFEST_FILE);
  if let Ok(raw) = fs::read_to_string(&manifest) {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
      return value
        .get("category")
        .and_then(|c| c.as_str())
        .unwrap_or("personal")
        .to_string();
    }
  }

  if repo.join("core").exists() && repo.join("composite").exists() {
    "framework".into()
  } else if repo.join("analytical").exists() || repo.join("empirical").exists() {
    "systems".into()
  } else if repo.join("experiments").exists() {
    "lab".into()
  } else {
    "personal".into()
  }
}
