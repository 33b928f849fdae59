//! Rule-based recommendations. Fixed rule order, no deduplication.
//!
//! Callers that want unique output wrap the result in
//! [`dedupe_recommendations`].

use std::collections::HashSet;

use crate::types::{HealthGrade, HealthMetric, Provenance, Status, Trend};

const LOW_OVERALL: f64 = 0.5;
const HIGH_OVERALL: f64 = 0.85;

/// "structural_health" → "Structural Health".
pub fn display_name(name: &str) -> String {
  name
    .split('_')
    .filter(|part| !part.is_empty())
    .map(|part| {
      let mut chars = part.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

fn label(metric: &HealthMetric) -> String {
  match metric.provenance {
    Provenance::Measured => display_name(&metric.name),
    Provenance::Estimated { .. } => format!("{} (estimated)", display_name(&metric.name)),
  }
}

/// Per-metric advisories. Critical status and a declining trend each fire.
pub fn metric_recommendations(metric: &HealthMetric) -> Vec<String> {
  let mut out = Vec::new();
  match metric.status {
    Status::Critical => out.push(format!(
      "CRITICAL: {} needs immediate attention (score: {:.2})",
      label(metric),
      metric.value
    )),
    Status::Poor => out.push(format!(
      "WARNING: {} below acceptable threshold (score: {:.2})",
      label(metric),
      metric.value
    )),
    _ => {}
  }
  if metric.trend == Trend::Declining {
    out.push(format!("DECLINING: {} is declining - investigate causes", label(metric)));
  }
  out
}

/// Full recommendation pass: metrics in order, then aggregate rules.
pub fn generate(metrics: &[HealthMetric], overall_score: f64, grade: HealthGrade) -> Vec<String> {
  let mut out: Vec<String> = metrics.iter().flat_map(metric_recommendations).collect();

  if overall_score < LOW_OVERALL {
    out.push("Consider running automated remediation tools".to_string());
    out.push("Review repository best practices documentation".to_string());
  }

  if grade.is_failing() {
    out.push("Repository health is poor - schedule comprehensive review".to_string());
  }

  if overall_score > HIGH_OVERALL {
    out.push("Excellent repository health - consider sharing as example".to_string());
  }

  out
}

/// Order-preserving dedupe; first occurrence wins.
pub fn dedupe_recommendations(recommendations: &[String]) -> Vec<String> {
  let mut seen = HashSet::new();
  recommendations
    .iter()
    .filter(|r| seen.insert(r.as_str()))
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{Category, EstimateFormula};
  use chrono::Utc;

  fn metric(name: &str, status: Status, trend: Trend, value: f64) -> HealthMetric {
    HealthMetric {
      name: name.into(),
      category: Category::Structural,
      value,
      weight: 0.25,
      status,
      trend,
      provenance: Provenance::Measured,
      last_updated: Utc::now(),
    }
  }

  #[test]
  fn display_name_title_cases() {
    assert_eq!(display_name("structural_health"), "Structural Health");
    assert_eq!(display_name("ci"), "Ci");
  }

  #[test]
  fn critical_and_declining_both_fire() {
    let m = metric("process_health", Status::Critical, Trend::Declining, 0.1);
    let recs = metric_recommendations(&m);
    assert_eq!(recs.len(), 2);
    assert!(recs[0].starts_with("CRITICAL: Process Health"));
    assert!(recs[0].contains("0.10"));
    assert!(recs[1].starts_with("DECLINING: Process Health"));
  }

  #[test]
  fn poor_status_flags_threshold() {
    let m = metric("content_health", Status::Poor, Trend::Stable, 0.5);
    let recs = metric_recommendations(&m);
    assert_eq!(recs, vec!["WARNING: Content Health below acceptable threshold (score: 0.50)"]);
  }

  #[test]
  fn healthy_metric_is_silent() {
    let m = metric("content_health", Status::Good, Trend::Improving, 0.85);
    assert!(metric_recommendations(&m).is_empty());
  }

  #[test]
  fn estimated_metrics_are_tagged() {
    let mut m = metric("evolution_health", Status::Critical, Trend::Stable, 0.1);
    m.provenance = Provenance::Estimated {
      formula: EstimateFormula::BaselinePlusMeanHealth,
    };
    let recs = metric_recommendations(&m);
    assert!(recs[0].contains("Evolution Health (estimated)"));
  }

  #[test]
  fn aggregate_rules_in_order() {
    let recs = generate(&[], 0.2, HealthGrade::F);
    assert_eq!(recs.len(), 3);
    assert!(recs[0].contains("automated remediation"));
    assert!(recs[1].contains("best practices"));
    assert!(recs[2].contains("comprehensive review"));
  }

  #[test]
  fn high_score_gets_positive_reinforcement() {
    let recs = generate(&[], 0.9, HealthGrade::A);
    assert_eq!(recs, vec!["Excellent repository health - consider sharing as example"]);
  }

  #[test]
  fn grade_d_without_low_score_triggers_review_only() {
    let recs = generate(&[], 0.47, HealthGrade::D);
    // 0.47 < 0.5 also fires the two low-score suggestions.
    assert_eq!(recs.len(), 3);
    let recs = generate(&[], 0.52, HealthGrade::D);
    assert_eq!(recs, vec!["Repository health is poor - schedule comprehensive review"]);
  }

  #[test]
  fn generator_keeps_duplicates_and_dedupe_removes_them() {
    let metrics = vec![
      metric("shared", Status::Critical, Trend::Stable, 0.0),
      metric("shared", Status::Critical, Trend::Stable, 0.0),
    ];
    let recs = generate(&metrics, 0.6, HealthGrade::C);
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0], recs[1]);
    assert_eq!(dedupe_recommendations(&recs).len(), 1);
  }

  #[test]
  fn dedupe_preserves_first_occurrence_order() {
    let input: Vec<String> = ["b", "a", "b", "c", "a"].iter().map(|s| s.to_string()).collect();
    assert_eq!(dedupe_recommendations(&input), vec!["b", "a", "c"]);
  }
}
