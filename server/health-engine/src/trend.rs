//! Trend classification over prior snapshots and the trend-based adjustment.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::types::{HistorySnapshot, Trend};

/// Key for the aggregate trend in `trend_analysis`.
pub const OVERALL_KEY: &str = "overall";

/// Score assumed for a category an older snapshot did not record.
const MISSING_CATEGORY_SCORE: f64 = 0.5;

/// Classify trends from history ordered oldest → newest.
///
/// With fewer than two snapshots only `"overall": insufficient_data` is
/// reported and no category keys are present.
pub fn analyze(history: &[HistorySnapshot], config: &Config) -> BTreeMap<String, Trend> {
  let mut trends = BTreeMap::new();

  if history.len() < 2 {
    trends.insert(OVERALL_KEY.to_string(), Trend::InsufficientData);
    return trends;
  }

  let overall: Vec<f64> = tail(history, config.overall_window)
    .iter()
    .map(|s| s.overall_score)
    .collect();
  trends.insert(
    OVERALL_KEY.to_string(),
    overall_trend(&overall, config.trend_tolerance),
  );

  let recent = tail(history, config.category_window);
  for def in &config.metrics {
    let scores: Vec<f64> = recent
      .iter()
      .map(|s| {
        s.category_scores
          .get(&def.name)
          .copied()
          .unwrap_or(MISSING_CATEGORY_SCORE)
      })
      .collect();
    trends.insert(def.name.clone(), category_trend(&scores));
  }

  trends
}

/// Compare the oldest and newest score with a relative tolerance band.
pub fn overall_trend(scores: &[f64], tolerance: f64) -> Trend {
  let (first, last) = match (scores.first(), scores.last()) {
    (Some(first), Some(last)) if scores.len() >= 2 => (*first, *last),
    _ => return Trend::InsufficientData,
  };

  if last > first * (1.0 + tolerance) {
    Trend::Improving
  } else if last < first * (1.0 - tolerance) {
    Trend::Declining
  } else {
    Trend::Stable
  }
}

/// Compare the oldest and newest score strictly, with no tolerance.
pub fn category_trend(scores: &[f64]) -> Trend {
  let (first, last) = match (scores.first(), scores.last()) {
    (Some(first), Some(last)) if scores.len() >= 2 => (*first, *last),
    _ => return Trend::InsufficientData,
  };

  if last > first {
    Trend::Improving
  } else if last < first {
    Trend::Declining
  } else {
    Trend::Stable
  }
}

/// Apply the trend bonus/penalty, clamped to [0, 1].
pub fn adjust(score: f64, trend: Trend, adjustment: f64) -> f64 {
  match trend {
    Trend::Improving => (score * (1.0 + adjustment)).min(1.0),
    Trend::Declining => (score * (1.0 - adjustment)).max(0.0),
    Trend::Stable | Trend::InsufficientData => score,
  }
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
  &items[items.len().saturating_sub(n)..]
}
