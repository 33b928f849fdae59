//! Category scoring and weighted aggregation.

use crate::config::{Config, MetricDefinition};
use crate::types::{Category, CategoryScore, EstimateFormula, RawScores};

/// Floor for the evolution estimate. No measured signal backs this constant.
const EVOLUTION_BASELINE: f64 = 0.8;
const EVOLUTION_HEALTH_FACTOR: f64 = 0.2;

/// Evolution has no raw source: a baseline nudged upward by mean measured health.
pub fn estimate_evolution(raw: &RawScores) -> CategoryScore {
  let value = (EVOLUTION_BASELINE + EVOLUTION_HEALTH_FACTOR * raw.mean()).min(1.0);
  CategoryScore::Estimated {
    formula: EstimateFormula::BaselinePlusMeanHealth,
    value,
  }
}

/// Score one category. Measured categories pass the raw input through verbatim.
pub fn score_category(category: Category, raw: &RawScores) -> CategoryScore {
  match raw.get(category) {
    Some(value) => CategoryScore::Measured(value),
    None => estimate_evolution(raw),
  }
}

/// Score every configured category, in catalog order.
pub fn score_all<'a>(
  config: &'a Config,
  raw: &RawScores,
) -> Vec<(&'a MetricDefinition, CategoryScore)> {
  config
    .metrics
    .iter()
    .map(|def| (def, score_category(def.category, raw)))
    .collect()
}

/// Fixed convex combination of category scores with configured weights,
/// clamped to [0, 1]. Weights may sum to 1.0 only within the load tolerance.
pub fn weighted_overall(scored: &[(&MetricDefinition, CategoryScore)]) -> f64 {
  scored
    .iter()
    .map(|(def, score)| score.value() * def.weight)
    .sum::<f64>()
    .clamp(0.0, 1.0)
}
