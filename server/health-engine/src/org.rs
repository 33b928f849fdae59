//! Organization-wide rollup over the latest snapshot of each repository.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{ComplianceLevel, HealthGrade, HistorySnapshot, Trend};

const CRITICAL_BELOW: f64 = 0.4;
const HEALTHY_ABOVE: f64 = 0.7;
const TARGET_AVERAGE: f64 = 0.6;
const BASIC_SHARE_LIMIT: f64 = 30.0;
const HEALTHY_SHARE: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoStatus {
  pub repo_name: String,
  pub overall_score: f64,
  pub health_grade: HealthGrade,
  pub compliance_level: ComplianceLevel,
  pub trend: Trend,
  pub violations_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgSummary {
  /// Repositories known to the store, with or without a recent snapshot.
  pub total_repos: usize,
  pub avg_score: f64,
  pub healthy_count: usize,
  pub critical_count: usize,
  pub compliance_distribution: BTreeMap<ComplianceLevel, usize>,
  pub trends: BTreeMap<Trend, Vec<String>>,
  pub repositories: Vec<RepoStatus>,
  pub recommendations: Vec<String>,
}

/// Summarize an organization.
///
/// `latest` pairs each known repository with its most recent snapshot, or
/// `None` when it has not been scored inside the reporting window.
pub fn summarize(latest: &[(String, Option<HistorySnapshot>)]) -> OrgSummary {
  let total_repos = latest.len();
  let mut distribution: BTreeMap<ComplianceLevel, usize> =
    ComplianceLevel::ALL.into_iter().map(|l| (l, 0)).collect();
  let mut trends: BTreeMap<Trend, Vec<String>> = BTreeMap::new();
  let mut repositories = Vec::new();
  let mut healthy_count = 0;
  let mut critical_count = 0;
  let mut score_sum = 0.0;

  for (repo, snapshot) in latest {
    let Some(snapshot) = snapshot else { continue };

    score_sum += snapshot.overall_score;
    *distribution.entry(snapshot.compliance_level).or_insert(0) += 1;
    if snapshot.overall_score < CRITICAL_BELOW {
      critical_count += 1;
    } else if snapshot.overall_score > HEALTHY_ABOVE {
      healthy_count += 1;
    }

    let trend = snapshot.overall_trend();
    trends.entry(trend).or_default().push(repo.clone());
    repositories.push(RepoStatus {
      repo_name: repo.clone(),
      overall_score: snapshot.overall_score,
      health_grade: snapshot.health_grade,
      compliance_level: snapshot.compliance_level,
      trend,
      violations_count: snapshot.violations_count,
    });
  }

  let avg_score = if repositories.is_empty() {
    0.0
  } else {
    score_sum / repositories.len() as f64
  };

  let mut summary = OrgSummary {
    total_repos,
    avg_score,
    healthy_count,
    critical_count,
    compliance_distribution: distribution,
    trends,
    repositories,
    recommendations: Vec::new(),
  };
  summary.recommendations = recommendations(&summary);
  summary
}

/// Organization-level advisories.
pub fn recommendations(summary: &OrgSummary) -> Vec<String> {
  let mut out = Vec::new();
  if summary.total_repos == 0 {
    return out;
  }

  if summary.critical_count > 0 {
    out.push(format!(
      "{} repositories have critical issues requiring immediate attention",
      summary.critical_count
    ));
  }

  if summary.avg_score < TARGET_AVERAGE {
    out.push(format!(
      "Organization-wide health score is below target ({:.1}) - consider training or process improvements",
      TARGET_AVERAGE
    ));
  }

  let basic = summary
    .compliance_distribution
    .get(&ComplianceLevel::Basic)
    .copied()
    .unwrap_or(0);
  let basic_pct = basic as f64 / summary.total_repos as f64 * 100.0;
  if basic_pct > BASIC_SHARE_LIMIT {
    out.push(format!(
      "{:.1}% of repositories at basic compliance - implement organization-wide standards",
      basic_pct
    ));
  }

  if summary.healthy_count as f64 > summary.total_repos as f64 * HEALTHY_SHARE {
    out.push("Strong overall repository health - document and share best practices".to_string());
  }

  out
}
