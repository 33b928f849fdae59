//! Core types for the health engine (JSON contracts + internal models).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the fact extractor sends)
// ---------------------------------------------------------------------------

/// Raw category scores from the fact extractor. Missing keys default to 0.0.
///
/// Accepts both the extractor's `*_health` keys and bare category names; when
/// both are present the `*_health` key wins. `null` counts as missing.
/// Unknown keys (including `overall_health`) are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawScoresWire")]
pub struct RawScores {
  #[serde(rename = "structural_health")]
  pub structural: f64,
  #[serde(rename = "content_health")]
  pub content: f64,
  #[serde(rename = "process_health")]
  pub process: f64,
  #[serde(rename = "security_health")]
  pub security: f64,
}

#[derive(Deserialize)]
struct RawScoresWire {
  structural_health: Option<f64>,
  structural: Option<f64>,
  content_health: Option<f64>,
  content: Option<f64>,
  process_health: Option<f64>,
  process: Option<f64>,
  security_health: Option<f64>,
  security: Option<f64>,
}

impl From<RawScoresWire> for RawScores {
  fn from(w: RawScoresWire) -> Self {
    let pick = |health: Option<f64>, bare: Option<f64>| health.or(bare).unwrap_or(0.0);
    Self::new(
      pick(w.structural_health, w.structural),
      pick(w.content_health, w.content),
      pick(w.process_health, w.process),
      pick(w.security_health, w.security),
    )
  }
}

impl RawScores {
  pub fn new(structural: f64, content: f64, process: f64, security: f64) -> Self {
    Self {
      structural,
      content,
      process,
      security,
    }
  }

  pub fn uniform(value: f64) -> Self {
    Self::new(value, value, value, value)
  }

  /// Measured score for a category; `None` for categories with no raw source.
  pub fn get(&self, category: Category) -> Option<f64> {
    match category {
      Category::Structural => Some(self.structural),
      Category::Content => Some(self.content),
      Category::Process => Some(self.process),
      Category::Security => Some(self.security),
      Category::Evolution => None,
    }
  }

  pub fn mean(&self) -> f64 {
    (self.structural + self.content + self.process + self.security) / 4.0
  }
}

/// One scoring request (stdin line for the CLI, request body for the service).
///
/// Shaped to accept repo-validator's JSON output directly.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
  #[serde(default)]
  pub repo_name: Option<String>,
  #[serde(default)]
  pub health_metrics: RawScores,
  #[serde(default)]
  pub violations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Structural,
  Content,
  Process,
  Security,
  Evolution,
}

impl Category {
  pub const ALL: [Category; 5] = [
    Category::Structural,
    Category::Content,
    Category::Process,
    Category::Security,
    Category::Evolution,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Structural => "structural",
      Self::Content => "content",
      Self::Process => "process",
      Self::Security => "security",
      Self::Evolution => "evolution",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How an estimated category score was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateFormula {
  /// `min(1.0, 0.8 + 0.2 * mean(measured scores))`.
  BaselinePlusMeanHealth,
}

/// A category score, tagged with whether it was measured or estimated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryScore {
  Measured(f64),
  Estimated { formula: EstimateFormula, value: f64 },
}

impl CategoryScore {
  pub fn value(&self) -> f64 {
    match *self {
      Self::Measured(v) => v,
      Self::Estimated { value, .. } => value,
    }
  }

  pub fn is_estimated(&self) -> bool {
    matches!(self, Self::Estimated { .. })
  }

  pub fn provenance(&self) -> Provenance {
    match *self {
      Self::Measured(_) => Provenance::Measured,
      Self::Estimated { formula, .. } => Provenance::Estimated { formula },
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
  Measured,
  Estimated { formula: EstimateFormula },
}

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Per-category status, derived from the category's threshold table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  Excellent,
  Good,
  Fair,
  Poor,
  Critical,
}

impl Status {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Excellent => "excellent",
      Self::Good => "good",
      Self::Fair => "fair",
      Self::Poor => "poor",
      Self::Critical => "critical",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
  Improving,
  Stable,
  Declining,
  InsufficientData,
}

impl Trend {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Improving => "improving",
      Self::Stable => "stable",
      Self::Declining => "declining",
      Self::InsufficientData => "insufficient_data",
    }
  }
}

/// Six ordered compliance bands over the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceLevel {
  Basic,
  Structured,
  Documented,
  Tested,
  Secure,
  Exemplary,
}

impl ComplianceLevel {
  pub const ALL: [ComplianceLevel; 6] = [
    ComplianceLevel::Basic,
    ComplianceLevel::Structured,
    ComplianceLevel::Documented,
    ComplianceLevel::Tested,
    ComplianceLevel::Secure,
    ComplianceLevel::Exemplary,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Basic => "basic",
      Self::Structured => "structured",
      Self::Documented => "documented",
      Self::Tested => "tested",
      Self::Secure => "secure",
      Self::Exemplary => "exemplary",
    }
  }

  pub fn from_str_loose(s: &str) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
  }
}

impl fmt::Display for ComplianceLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Twelve-step letter grade; a presentation remap of the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthGrade {
  #[serde(rename = "A+")]
  APlus,
  #[serde(rename = "A")]
  A,
  #[serde(rename = "A-")]
  AMinus,
  #[serde(rename = "B+")]
  BPlus,
  #[serde(rename = "B")]
  B,
  #[serde(rename = "B-")]
  BMinus,
  #[serde(rename = "C+")]
  CPlus,
  #[serde(rename = "C")]
  C,
  #[serde(rename = "C-")]
  CMinus,
  #[serde(rename = "D+")]
  DPlus,
  #[serde(rename = "D")]
  D,
  #[serde(rename = "F")]
  F,
}

impl HealthGrade {
  pub const ALL: [HealthGrade; 12] = [
    HealthGrade::APlus,
    HealthGrade::A,
    HealthGrade::AMinus,
    HealthGrade::BPlus,
    HealthGrade::B,
    HealthGrade::BMinus,
    HealthGrade::CPlus,
    HealthGrade::C,
    HealthGrade::CMinus,
    HealthGrade::DPlus,
    HealthGrade::D,
    HealthGrade::F,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::APlus => "A+",
      Self::A => "A",
      Self::AMinus => "A-",
      Self::BPlus => "B+",
      Self::B => "B",
      Self::BMinus => "B-",
      Self::CPlus => "C+",
      Self::C => "C",
      Self::CMinus => "C-",
      Self::DPlus => "D+",
      Self::D => "D",
      Self::F => "F",
    }
  }

  pub fn from_str_loose(s: &str) -> Option<Self> {
    let s = s.trim();
    Self::ALL
      .into_iter()
      .find(|grade| grade.as_str().eq_ignore_ascii_case(s))
  }

  /// D and F both count as failing health for recommendation purposes.
  pub fn is_failing(self) -> bool {
    matches!(self, Self::D | Self::F)
  }
}

impl fmt::Display for HealthGrade {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// One scored category. Produced only by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
  pub name: String,
  pub category: Category,
  pub value: f64,
  pub weight: f64,
  pub status: Status,
  pub trend: Trend,
  pub provenance: Provenance,
  pub last_updated: DateTime<Utc>,
}

/// Result of one scoring run.
///
/// `overall_score` is the reported, trend-adjusted score.
/// `compliance_level` and `health_grade` are derived from
/// `raw_score_for_classification`, so the two may disagree by up to 2%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceScore {
  pub overall_score: f64,
  pub raw_score_for_classification: f64,
  pub category_scores: BTreeMap<String, f64>,
  pub metrics: Vec<HealthMetric>,
  pub compliance_level: ComplianceLevel,
  pub health_grade: HealthGrade,
  pub trend_analysis: BTreeMap<String, Trend>,
  pub recommendations: Vec<String>,
  pub generated_at: DateTime<Utc>,
}

/// Persisted record of one scoring run. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
  #[serde(deserialize_with = "crate::store::lenient_timestamp")]
  pub timestamp: DateTime<Utc>,
  pub overall_score: f64,
  pub compliance_level: ComplianceLevel,
  pub health_grade: HealthGrade,
  #[serde(default)]
  pub category_scores: BTreeMap<String, f64>,
  #[serde(default)]
  pub trend_analysis: BTreeMap<String, Trend>,
  #[serde(default)]
  pub violations_count: u64,
}

impl HistorySnapshot {
  pub fn from_score(score: &ComplianceScore, violations_count: u64) -> Self {
    Self {
      timestamp: score.generated_at,
      overall_score: score.overall_score,
      compliance_level: score.compliance_level,
      health_grade: score.health_grade,
      category_scores: score.category_scores.clone(),
      trend_analysis: score.trend_analysis.clone(),
      violations_count,
    }
  }

  /// Overall trend recorded with this snapshot; stable when absent.
  pub fn overall_trend(&self) -> Trend {
    self
      .trend_analysis
      .get(crate::trend::OVERALL_KEY)
      .copied()
      .unwrap_or(Trend::Stable)
  }
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn health_key_wins_over_bare_name() {
    let raw: RawScores = serde_json::from_str(
      r#"{"structural": 0.2, "structural_health": 0.9, "content": 0.4, "overall_health": 0.7}"#,
    )
    .unwrap();
    assert_eq!(raw, RawScores::new(0.9, 0.4, 0.0, 0.0));
  }

  #[test]
  fn null_and_missing_scores_default_to_zero() {
    let raw: RawScores =
      serde_json::from_str(r#"{"process_health": null, "security": 0.6}"#).unwrap();
    assert_eq!(raw, RawScores::new(0.0, 0.0, 0.0, 0.6));
  }

  #[test]
  fn raw_scores_serialize_with_health_keys() {
    let json = serde_json::to_value(RawScores::new(0.1, 0.2, 0.3, 0.4)).unwrap();
    assert_eq!(json["structural_health"], 0.1);
    assert_eq!(json["security_health"], 0.4);
    assert!(json.get("structural").is_none());
  }
}
