//! Engine configuration: the metric catalog plus trend tunables.
//!
//! Every constructor path runs [`Config::validate`], so an `Engine` never
//! sees a catalog whose weights fail to sum to 1.0.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::{Category, Status};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Minimum score per status, strictly decreasing from excellent to critical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
  pub excellent: f64,
  pub good: f64,
  pub fair: f64,
  pub poor: f64,
  pub critical: f64,
}

impl Thresholds {
  pub const fn new(excellent: f64, good: f64, fair: f64, poor: f64, critical: f64) -> Self {
    Self {
      excellent,
      good,
      fair,
      poor,
      critical,
    }
  }

  /// Cutoffs in evaluation order.
  pub fn ordered(&self) -> [(Status, f64); 5] {
    [
      (Status::Excellent, self.excellent),
      (Status::Good, self.good),
      (Status::Fair, self.fair),
      (Status::Poor, self.poor),
      (Status::Critical, self.critical),
    ]
  }

  fn is_strictly_decreasing(&self) -> bool {
    self
      .ordered()
      .windows(2)
      .all(|pair| pair[0].1 > pair[1].1)
  }
}

/// One category in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
  pub name: String,
  pub category: Category,
  pub weight: f64,
  /// Sub-component weights. Documentation only; never re-aggregated.
  #[serde(default)]
  pub components: BTreeMap<String, f64>,
  pub thresholds: Thresholds,
}

impl MetricDefinition {
  fn new(
    name: &str,
    category: Category,
    weight: f64,
    components: &[(&str, f64)],
    thresholds: Thresholds,
  ) -> Self {
    Self {
      name: name.to_string(),
      category,
      weight,
      components: components
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect(),
      thresholds,
    }
  }
}

fn default_overall_window() -> usize {
  5
}

fn default_category_window() -> usize {
  3
}

fn default_trend_tolerance() -> f64 {
  0.05
}

fn default_trend_adjustment() -> f64 {
  0.02
}

/// Catalog + tunables for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  /// Ordered catalog; output metrics follow this order.
  pub metrics: Vec<MetricDefinition>,
  /// Snapshots considered for the overall trend.
  #[serde(default = "default_overall_window")]
  pub overall_window: usize,
  /// Snapshots considered for each category trend.
  #[serde(default = "default_category_window")]
  pub category_window: usize,
  /// Relative change the overall score must exceed to count as a trend (0..1).
  #[serde(default = "default_trend_tolerance")]
  pub trend_tolerance: f64,
  /// Multiplicative bonus/penalty applied for an improving/declining trend (0..1).
  #[serde(default = "default_trend_adjustment")]
  pub trend_adjustment: f64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      metrics: vec![
        MetricDefinition::new(
          "structural_health",
          Category::Structural,
          0.25,
          &[
            ("directory_compliance", 0.4),
            ("file_presence", 0.3),
            ("naming_conventions", 0.2),
            ("organization_clarity", 0.1),
          ],
          Thresholds::new(0.95, 0.85, 0.70, 0.50, 0.30),
        ),
        MetricDefinition::new(
          "content_health",
          Category::Content,
          0.25,
          &[
            ("documentation_completeness", 0.35),
            ("model_compliance", 0.30),
            ("manifest_validity", 0.20),
            ("content_quality", 0.15),
          ],
          Thresholds::new(0.90, 0.80, 0.65, 0.45, 0.25),
        ),
        MetricDefinition::new(
          "process_health",
          Category::Process,
          0.20,
          &[
            ("automation_presence", 0.4),
            ("validation_integration", 0.3),
            ("ci_cd_effectiveness", 0.2),
            ("workflow_optimization", 0.1),
          ],
          Thresholds::new(0.85, 0.70, 0.55, 0.35, 0.20),
        ),
        MetricDefinition::new(
          "security_health",
          Category::Security,
          0.15,
          &[
            ("security_policy", 0.4),
            ("dependency_scanning", 0.3),
            ("access_control", 0.2),
            ("vulnerability_management", 0.1),
          ],
          Thresholds::new(0.90, 0.75, 0.60, 0.40, 0.20),
        ),
        MetricDefinition::new(
          "evolution_health",
          Category::Evolution,
          0.15,
          &[
            ("change_frequency", 0.3),
            ("improvement_trend", 0.3),
            ("adaptation_capability", 0.2),
            ("innovation_indicators", 0.2),
          ],
          Thresholds::new(0.80, 0.65, 0.50, 0.35, 0.20),
        ),
      ],
      overall_window: default_overall_window(),
      category_window: default_category_window(),
      trend_tolerance: default_trend_tolerance(),
      trend_adjustment: default_trend_adjustment(),
    }
  }
}

impl Config {
  /// Parse and validate a JSON configuration document.
  pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
    let config: Config = serde_json::from_str(raw)?;
    config.validate()?;
    Ok(config)
  }

  /// Read, parse and validate a JSON configuration file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    Self::from_json_str(&raw)
  }

  /// Snapshots a caller must supply for both trend windows.
  pub fn history_window(&self) -> usize {
    self.overall_window.max(self.category_window)
  }

  /// Check catalog invariants: each category exactly once, weights in (0,1]
  /// summing to 1.0, strictly decreasing thresholds, sane tunables.
  pub fn validate(&self) -> Result<(), ConfigError> {
    for category in Category::ALL {
      let count = self.metrics.iter().filter(|d| d.category == category).count();
      match count {
        0 => {
          return Err(ConfigError::invalid(
            "metrics",
            &format!("missing definition for category {}", category),
          ))
        }
        1 => {}
        _ => {
          return Err(ConfigError::invalid(
            "metrics",
            &format!("category {} defined {} times", category, count),
          ))
        }
      }
    }

    let mut names: Vec<&str> = self.metrics.iter().map(|d| d.name.as_str()).collect();
    names.sort_unstable();
    if names.windows(2).any(|pair| pair[0] == pair[1]) {
      return Err(ConfigError::invalid("metrics", "metric names must be unique"));
    }

    for def in &self.metrics {
      if def.name.trim().is_empty() {
        return Err(ConfigError::invalid("metrics[].name", "must not be empty"));
      }
      if def.name == crate::trend::OVERALL_KEY {
        return Err(ConfigError::invalid(
          "metrics[].name",
          "\"overall\" is reserved for the aggregate trend",
        ));
      }
      if !(def.weight > 0.0 && def.weight <= 1.0) {
        return Err(ConfigError::invalid(
          &format!("{}.weight", def.name),
          "must be in (0, 1]",
        ));
      }
      if !def.thresholds.is_strictly_decreasing() {
        return Err(ConfigError::invalid(
          &format!("{}.thresholds", def.name),
          "cutoffs must be strictly decreasing from excellent to critical",
        ));
      }
    }

    let total: f64 = self.metrics.iter().map(|d| d.weight).sum();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      return Err(ConfigError::invalid(
        "metrics[].weight",
        &format!("weights must sum to 1.0, got {:.6}", total),
      ));
    }

    if self.overall_window < 2 {
      return Err(ConfigError::invalid("overall_window", "must be at least 2"));
    }
    if self.category_window < 2 {
      return Err(ConfigError::invalid("category_window", "must be at least 2"));
    }
    if !(0.0..1.0).contains(&self.trend_tolerance) {
      return Err(ConfigError::invalid("trend_tolerance", "must be in [0, 1)"));
    }
    if !(0.0..1.0).contains(&self.trend_adjustment) {
      return Err(ConfigError::invalid("trend_adjustment", "must be in [0, 1)"));
    }

    Ok(())
  }
}
