//! Schema input and validation output types (JSON contract with health-engine).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Schema (input)
// ---------------------------------------------------------------------------

/// Top-level schema document: one entry per repository type plus weights.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaDocument {
  #[serde(default)]
  pub repository_schemas: BTreeMap<String, RepositorySchema>,
  #[serde(default)]
  pub validation_rules: ValidationRules,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositorySchema {
  #[serde(default)]
  pub required_directories: Vec<String>,
  #[serde(default)]
  pub required_files: Vec<String>,
  /// Named regex patterns. `model_files` overrides the model file pattern.
  #[serde(default)]
  pub naming_conventions: BTreeMap<String, String>,
  #[serde(default)]
  pub content_requirements: ContentRequirements,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentRequirements {
  #[serde(default)]
  pub readme_min_length: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationRules {
  #[serde(default)]
  pub structural: Option<RuleWeight>,
  #[serde(default)]
  pub content: Option<RuleWeight>,
  #[serde(default)]
  pub process: Option<RuleWeight>,
  #[serde(default)]
  pub security: Option<RuleWeight>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RuleWeight {
  pub weight: f64,
}

/// Resolved category weights for the validator's own overall score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
  pub structural: f64,
  pub content: f64,
  pub process: f64,
  pub security: f64,
}

impl Default for Weights {
  fn default() -> Self {
    Self {
      structural: 0.3,
      content: 0.3,
      process: 0.2,
      security: 0.2,
    }
  }
}

impl ValidationRules {
  pub fn weights(&self) -> Weights {
    let d = Weights::default();
    Weights {
      structural: self.structural.map_or(d.structural, |r| r.weight),
      content: self.content.map_or(d.content, |r| r.weight),
      process: self.process.map_or(d.process, |r| r.weight),
      security: self.security.map_or(d.security, |r| r.weight),
    }
  }
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// One failed check. Rendered as a flat string in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
  MissingDirectory(String),
  MissingFile(String),
  ModelFileNaming(String),
  DirectoryNotLowercase(String),
  ReadmeTooShort(usize),
  ReadmeMissingSections,
  ReadmeUnreadable(String),
  ManifestMissingField(String),
  ManifestInvalidCategory(String),
  ManifestInvalidJson(String),
  ManifestUnreadable(String),
  ModelMissingId(String),
  ModelMissingLayers(String),
  ModelUnreadable { file: String, reason: String },
  NoWorkflows,
  NoValidationTools,
  NoAutomationScripts,
  NoSecurityPolicy,
  NoDependencyScanning,
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingDirectory(d) => write!(f, "Missing required directory: {}", d),
      Self::MissingFile(p) => write!(f, "Missing required file: {}", p),
      Self::ModelFileNaming(n) => {
        write!(f, "Model file {} doesn't follow FCM naming convention", n)
      }
      Self::DirectoryNotLowercase(n) => write!(f, "Directory {} should be lowercase", n),
      Self::ReadmeTooShort(min) => {
        write!(f, "README.md is too short (minimum {} characters)", min)
      }
      Self::ReadmeMissingSections => write!(f, "README.md missing proper markdown sections"),
      Self::ReadmeUnreadable(e) => write!(f, "Error reading README.md: {}", e),
      Self::ManifestMissingField(k) => write!(f, "Manifest missing required field: {}", k),
      Self::ManifestInvalidCategory(c) => write!(f, "Invalid repository category: {}", c),
      Self::ManifestInvalidJson(e) => write!(f, "Invalid JSON in manifest: {}", e),
      Self::ManifestUnreadable(e) => write!(f, "Error reading manifest: {}", e),
      Self::ModelMissingId(n) => write!(f, "{} missing Model ID", n),
      Self::ModelMissingLayers(n) => write!(f, "{} missing FCM layer structure", n),
      Self::ModelUnreadable { file, reason } => write!(f, "Error reading {}: {}", file, reason),
      Self::NoWorkflows => write!(f, "No GitHub workflows found"),
      Self::NoValidationTools => write!(f, "No validation tools found"),
      Self::NoAutomationScripts => write!(f, "No automation scripts found"),
      Self::NoSecurityPolicy => write!(f, "No security policy found"),
      Self::NoDependencyScanning => write!(f, "No dependency scanning configured"),
    }
  }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Preliminary level from the validator's own bands (violation-aware).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceLevel {
  Basic,
  Structured,
  Documented,
  Tested,
  Secure,
  Exemplary,
}

/// Category scores; key names are what health-engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthMetrics {
  pub structural_health: f64,
  pub content_health: f64,
  pub process_health: f64,
  pub security_health: f64,
  pub overall_health: f64,
}

/// One JSON object to stdout.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
  pub repo_name: String,
  pub repository_type: String,
  pub score: f64,
  pub compliance_level: ComplianceLevel,
  pub violations: Vec<String>,
  pub recommendations: Vec<String>,
  pub health_metrics: HealthMetrics,
}

/// Score and violations for one category check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOutcome {
  pub score: f64,
  pub violations: Vec<Violation>,
}

impl CheckOutcome {
  /// Fraction of passed checks; 1.0 when nothing applied.
  pub fn from_counts(passed: usize, total: usize, violations: Vec<Violation>) -> Self {
    let score = if total == 0 {
      1.0
    } else {
      passed as f64 / total as f64
    };
    Self { score, violations }
  }
}
