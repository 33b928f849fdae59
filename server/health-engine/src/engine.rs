//! Core engine: scores one repository run, classifies, applies trends, records.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::category;
use crate::classify;
use crate::config::Config;
use crate::error::{ConfigError, StoreError};
use crate::recommend;
use crate::store::HistoryStore;
use crate::trend;
use crate::types::*;

/// The scoring engine. Holds only validated configuration; history is passed in.
#[derive(Debug, Clone)]
pub struct Engine {
  config: Config,
}

/// Result of [`Engine::score_and_record`]. The score is always present; store
/// failures are reported next to it rather than replacing it.
#[derive(Debug)]
pub struct ScoringOutcome {
  pub score: ComplianceScore,
  pub snapshot: HistorySnapshot,
  pub history_error: Option<StoreError>,
  pub persist_error: Option<StoreError>,
}

impl ScoringOutcome {
  pub fn persisted(&self) -> bool {
    self.persist_error.is_none()
  }

  /// Record the result of appending `self.snapshot` to a store.
  pub fn record_append(&mut self, repo_name: &str, result: Result<(), StoreError>) {
    match result {
      Ok(()) => {
        info!(
          repo = repo_name,
          overall_score = self.snapshot.overall_score,
          grade = self.snapshot.health_grade.as_str(),
          "snapshot recorded"
        );
        self.persist_error = None;
      }
      Err(e) => {
        warn!(repo = repo_name, error = %e, "snapshot append failed");
        self.persist_error = Some(e);
      }
    }
  }
}

impl Engine {
  pub fn new(config: Config) -> Result<Self, ConfigError> {
    config.validate()?;
    Ok(Self { config })
  }

  pub fn with_defaults() -> Self {
    Self {
      config: Config::default(),
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Score one run. `history` is ordered oldest → newest.
  pub fn score(&self, raw: &RawScores, history: &[HistorySnapshot]) -> ComplianceScore {
    self.score_at(raw, history, Utc::now())
  }

  /// Same as [`Engine::score`] with an explicit clock.
  pub fn score_at(
    &self,
    raw: &RawScores,
    history: &[HistorySnapshot],
    now: DateTime<Utc>,
  ) -> ComplianceScore {
    let scored = category::score_all(&self.config, raw);

    let mut category_scores = BTreeMap::new();
    let mut metrics = Vec::with_capacity(scored.len());
    for (def, score) in &scored {
      category_scores.insert(def.name.clone(), score.value());
      metrics.push(HealthMetric {
        name: def.name.clone(),
        category: def.category,
        value: score.value(),
        weight: def.weight,
        status: classify::status(score.value(), &def.thresholds),
        trend: Trend::Stable,
        provenance: score.provenance(),
        last_updated: now,
      });
    }

    // Classification uses the score before any trend adjustment.
    let raw_overall = category::weighted_overall(&scored);
    let compliance_level = classify::compliance_level(raw_overall);
    let health_grade = classify::health_grade(raw_overall);

    let trend_analysis = trend::analyze(history, &self.config);
    let overall_trend = trend_analysis
      .get(trend::OVERALL_KEY)
      .copied()
      .unwrap_or(Trend::Stable);
    let overall_score = trend::adjust(raw_overall, overall_trend, self.config.trend_adjustment);

    for metric in &mut metrics {
      metric.trend = trend_analysis
        .get(&metric.name)
        .copied()
        .unwrap_or(Trend::Stable);
    }

    let recommendations = recommend::generate(&metrics, overall_score, health_grade);

    debug!(
      raw_overall,
      overall_score,
      trend = overall_trend.as_str(),
      level = compliance_level.as_str(),
      grade = health_grade.as_str(),
      history_len = history.len(),
      "scored repository"
    );

    ComplianceScore {
      overall_score,
      raw_score_for_classification: raw_overall,
      category_scores,
      metrics,
      compliance_level,
      health_grade,
      trend_analysis,
      recommendations,
      generated_at: now,
    }
  }

  /// Read recent history from `store`, score, and append one snapshot.
  ///
  /// A failed read scores against empty history; a failed append is reported
  /// in the outcome. Neither prevents the score from being returned.
  pub fn score_and_record<S: HistoryStore + ?Sized>(
    &self,
    repo_name: &str,
    raw: &RawScores,
    violations_count: u64,
    store: &mut S,
  ) -> ScoringOutcome {
    let recent = store.recent(repo_name, self.config.history_window());
    let mut outcome = self.score_from_recent(repo_name, raw, violations_count, recent);
    let appended = store.append(repo_name, &outcome.snapshot);
    outcome.record_append(repo_name, appended);
    outcome
  }

  /// Score against the result of reading `history_window()` snapshots,
  /// newest first as [`HistoryStore::recent`] returns them.
  ///
  /// For stores that cannot implement [`HistoryStore`] (async backends): the
  /// caller reads, calls this, appends `outcome.snapshot` and reports the
  /// result through [`ScoringOutcome::record_append`].
  pub fn score_from_recent(
    &self,
    repo_name: &str,
    raw: &RawScores,
    violations_count: u64,
    recent: Result<Vec<HistorySnapshot>, StoreError>,
  ) -> ScoringOutcome {
    let (history, history_error) = match recent {
      Ok(mut newest_first) => {
        newest_first.reverse();
        (newest_first, None)
      }
      Err(e) => {
        warn!(repo = repo_name, error = %e, "history read failed; scoring without history");
        (Vec::new(), Some(e))
      }
    };

    let score = self.score(raw, &history);
    let snapshot = HistorySnapshot::from_score(&score, violations_count);

    ScoringOutcome {
      score,
      snapshot,
      history_error,
      persist_error: None,
    }
  }
}
