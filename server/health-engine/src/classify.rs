//! Threshold mapping: per-category status, compliance level, letter grade.
//!
//! Level and grade are different granularities over the same
//! [0,1] range. Both are computed from the pre-adjustment score.

use crate::config::Thresholds;
use crate::types::{ComplianceLevel, HealthGrade, Status};

/// First status whose cutoff the score meets, evaluated excellent → poor.
/// Anything below the poor cutoff is critical.
pub fn status(score: f64, thresholds: &Thresholds) -> Status {
  thresholds
    .ordered()
    .into_iter()
    .take(4)
    .find(|(_, cutoff)| score >= *cutoff)
    .map(|(status, _)| status)
    .unwrap_or(Status::Critical)
}

const LEVEL_BANDS: [(f64, ComplianceLevel); 5] = [
  (0.90, ComplianceLevel::Exemplary),
  (0.75, ComplianceLevel::Secure),
  (0.60, ComplianceLevel::Tested),
  (0.45, ComplianceLevel::Documented),
  (0.30, ComplianceLevel::Structured),
];

pub fn compliance_level(score: f64) -> ComplianceLevel {
  LEVEL_BANDS
    .iter()
    .find(|(cutoff, _)| score >= *cutoff)
    .map(|(_, level)| *level)
    .unwrap_or(ComplianceLevel::Basic)
}

const GRADE_BANDS: [(f64, HealthGrade); 11] = [
  (0.95, HealthGrade::APlus),
  (0.90, HealthGrade::A),
  (0.85, HealthGrade::AMinus),
  (0.80, HealthGrade::BPlus),
  (0.75, HealthGrade::B),
  (0.70, HealthGrade::BMinus),
  (0.65, HealthGrade::CPlus),
  (0.60, HealthGrade::C),
  (0.55, HealthGrade::CMinus),
  (0.50, HealthGrade::DPlus),
  (0.45, HealthGrade::D),
];

pub fn health_grade(score: f64) -> HealthGrade {
  GRADE_BANDS
    .iter()
    .find(|(cutoff, _)| score >= *cutoff)
    .map(|(_, grade)| *grade)
    .unwrap_or(HealthGrade::F)
}
