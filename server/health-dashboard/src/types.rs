//! Request/response types for the dashboard service.

use health_engine::{ComplianceScore, HistorySnapshot, RawScores, ScoringOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ScorePayload {
  pub repo_name: String,
  #[serde(default)]
  pub health_metrics: RawScores,
  #[serde(default)]
  pub violations: Vec<String>,
}

/// Score plus the fate of this run's history read and snapshot append.
#[derive(Debug, Serialize)]
pub struct ScoreResponse {
  pub repo_name: String,
  #[serde(flatten)]
  pub score: ComplianceScore,
  pub persisted: bool,
  /// Set when prior snapshots could not be read; trends then show no history.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub history_error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub persist_error: Option<String>,
}

impl ScoreResponse {
  pub fn from_outcome(repo_name: String, outcome: ScoringOutcome) -> Self {
    Self {
      repo_name,
      persisted: outcome.persisted(),
      history_error: outcome.history_error.map(|e| e.to_string()),
      persist_error: outcome.persist_error.map(|e| e.to_string()),
      score: outcome.score,
    }
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
  pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ReposResponse {
  pub repositories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
  pub repo_name: String,
  pub days: i64,
  /// Newest first.
  pub snapshots: Vec<HistorySnapshot>,
}
