//! Markdown dashboard rendering.

use chrono::{DateTime, Utc};
use health_engine::org::OrgSummary;
use health_engine::recommend::display_name;
use health_engine::{HistorySnapshot, Trend};
use std::fmt::Write;

const CRITICAL_BELOW: f64 = 0.4;
const HISTORY_ROWS: usize = 10;

/// Organization dashboard from a summary.
pub fn org_dashboard(summary: &OrgSummary, generated_at: DateTime<Utc>) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "# Repository Health Dashboard");
  let _ = writeln!(out, "*Generated: {}*", generated_at.format("%Y-%m-%d %H:%M:%S"));
  let _ = writeln!(out);

  let _ = writeln!(out, "## Organization Summary");
  let _ = writeln!(out);
  let _ = writeln!(out, "- **Total Repositories:** {}", summary.total_repos);
  let _ = writeln!(out, "- **Average Health Score:** {:.2}", summary.avg_score);
  let _ = writeln!(
    out,
    "- **Healthy Repositories:** {}/{}",
    summary.healthy_count, summary.total_repos
  );
  let _ = writeln!(out, "- **Critical Issues:** {}", summary.critical_count);
  let _ = writeln!(out);

  let _ = writeln!(out, "## Compliance Distribution");
  let _ = writeln!(out);
  let _ = writeln!(out, "| Level | Count | Percentage |");
  let _ = writeln!(out, "|-------|-------|------------|");
  for (level, count) in &summary.compliance_distribution {
    let pct = if summary.total_repos > 0 {
      *count as f64 / summary.total_repos as f64 * 100.0
    } else {
      0.0
    };
    let _ = writeln!(out, "| {} | {} | {:.1}% |", display_name(level.as_str()), count, pct);
  }
  let _ = writeln!(out);

  let _ = writeln!(out, "## Repository Details");
  let _ = writeln!(out);
  let _ = writeln!(out, "| Repository | Score | Grade | Level | Trend | Issues |");
  let _ = writeln!(out, "|------------|-------|-------|-------|-------|--------|");
  for repo in &summary.repositories {
    let _ = writeln!(
      out,
      "| {} | {:.2} | {} | {} | {} | {} |",
      repo.repo_name,
      repo.overall_score,
      repo.health_grade,
      repo.compliance_level,
      repo.trend.as_str(),
      repo.violations_count
    );
  }
  let _ = writeln!(out);

  let critical: Vec<_> = summary
    .repositories
    .iter()
    .filter(|r| r.overall_score < CRITICAL_BELOW)
    .collect();
  if !critical.is_empty() {
    let _ = writeln!(out, "## Critical Issues");
    let _ = writeln!(out);
    for repo in critical {
      let _ = writeln!(
        out,
        "- **{}**: Score {:.2} - {} violations",
        repo.repo_name, repo.overall_score, repo.violations_count
      );
    }
    let _ = writeln!(out);
  }

  let _ = writeln!(out, "## Trend Analysis");
  let _ = writeln!(out);
  for (trend, repos) in &summary.trends {
    if repos.is_empty() {
      continue;
    }
    let _ = writeln!(
      out,
      "### {} ({} repositories)",
      display_name(trend.as_str()),
      repos.len()
    );
    for repo in repos {
      let _ = writeln!(out, "- {}", repo);
    }
    let _ = writeln!(out);
  }

  if !summary.recommendations.is_empty() {
    let _ = writeln!(out, "## Organizational Recommendations");
    let _ = writeln!(out);
    for rec in &summary.recommendations {
      let _ = writeln!(out, "- {}", rec);
    }
    let _ = writeln!(out);
  }

  out
}

/// Report for one repository. `history` is newest first.
pub fn repository_report(repo_name: &str, days: i64, history: &[HistorySnapshot]) -> String {
  let Some(latest) = history.first() else {
    return format!("No health data found for repository: {}", repo_name);
  };

  let mut out = String::new();
  let _ = writeln!(out, "# Repository Health Report: {}", repo_name);
  let _ = writeln!(out, "*Period: Last {} days*", days);
  let _ = writeln!(out);

  let trend = latest.overall_trend();
  let _ = writeln!(out, "## Current Status");
  let _ = writeln!(
    out,
    "- **Overall Score:** {:.2} ({})",
    latest.overall_score, latest.health_grade
  );
  let _ = writeln!(out, "- **Compliance Level:** {}", latest.compliance_level);
  let _ = writeln!(out, "- **Violations:** {}", latest.violations_count);
  let _ = writeln!(out, "- **Trend:** {}", trend_label(trend));
  let _ = writeln!(
    out,
    "- **Last Updated:** {}",
    latest.timestamp.format("%Y-%m-%d %H:%M:%S")
  );
  let _ = writeln!(out);

  let _ = writeln!(out, "## Category Scores");
  for (category, score) in &latest.category_scores {
    let _ = writeln!(out, "- **{}:** {:.2}", display_name(category), score);
  }
  let _ = writeln!(out);

  if history.len() > 1 {
    let _ = writeln!(out, "## Historical Trend");
    let _ = writeln!(out, "```");
    let _ = writeln!(out, "Date       | Score | Grade | Issues");
    let _ = writeln!(out, "-----------|-------|-------|-------");
    for h in history.iter().take(HISTORY_ROWS) {
      let _ = writeln!(
        out,
        "{} | {:.2}  | {:5} | {:6}",
        h.timestamp.format("%Y-%m-%d"),
        h.overall_score,
        h.health_grade.as_str(),
        h.violations_count
      );
    }
    let _ = writeln!(out, "```");
    let _ = writeln!(out);
  }

  out
}

fn trend_label(trend: Trend) -> &'static str {
  match trend {
    Trend::InsufficientData => "insufficient data",
    other => other.as_str(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use health_engine::org::summarize;
  use health_engine::{ComplianceLevel, HealthGrade};
  use std::collections::BTreeMap;

  fn snap(day: u32, score: f64, grade: HealthGrade, level: ComplianceLevel) -> HistorySnapshot {
    HistorySnapshot {
      timestamp: Utc.with_ymd_and_hms(2025, 4, day, 9, 0, 0).unwrap(),
      overall_score: score,
      compliance_level: level,
      health_grade: grade,
      category_scores: BTreeMap::from([
        ("content_health".to_string(), 0.5),
        ("structural_health".to_string(), 0.75),
      ]),
      trend_analysis: BTreeMap::from([("overall".to_string(), Trend::Declining)]),
      violations_count: 3,
    }
  }

  #[test]
  fn org_dashboard_sections() {
    let summary = summarize(&[
      (
        "alpha".to_string(),
        Some(snap(2, 0.3, HealthGrade::F, ComplianceLevel::Structured)),
      ),
      (
        "beta".to_string(),
        Some(snap(2, 0.8, HealthGrade::BPlus, ComplianceLevel::Secure)),
      ),
    ]);
    let now = Utc.with_ymd_and_hms(2025, 4, 2, 10, 0, 0).unwrap();
    let md = org_dashboard(&summary, now);

    assert!(md.starts_with("# Repository Health Dashboard\n*Generated: 2025-04-02 10:00:00*"));
    assert!(md.contains("- **Healthy Repositories:** 1/2"));
    assert!(md.contains("| Secure | 1 | 50.0% |"));
    assert!(md.contains("| Basic | 0 | 0.0% |"));
    assert!(md.contains("| alpha | 0.30 | F | structured | declining | 3 |"));
    assert!(md.contains("- **alpha**: Score 0.30 - 3 violations"));
    assert!(md.contains("### Declining (2 repositories)"));
    assert!(md.contains("## Organizational Recommendations"));
  }

  #[test]
  fn empty_window_message() {
    assert_eq!(
      repository_report("ghost", 30, &[]),
      "No health data found for repository: ghost"
    );
  }

  #[test]
  fn repository_report_lists_history_newest_first() {
    let history = vec![
      snap(3, 0.82, HealthGrade::AMinus, ComplianceLevel::Secure),
      snap(1, 0.61, HealthGrade::CPlus, ComplianceLevel::Tested),
    ];
    let md = repository_report("fcm-lab", 7, &history);
    assert!(md.contains("*Period: Last 7 days*"));
    assert!(md.contains("- **Overall Score:** 0.82 (A-)"));
    assert!(md.contains("- **Trend:** declining"));
    assert!(md.contains("- **Structural Health:** 0.75"));
    let first = md.find("2025-04-03 | 0.82").unwrap();
    let second = md.find("2025-04-01 | 0.61").unwrap();
    assert!(first < second);
  }

  #[test]
  fn single_snapshot_has_no_history_table() {
    let md = repository_report(
      "solo",
      30,
      &[snap(1, 0.5, HealthGrade::DPlus, ComplianceLevel::Documented)],
    );
    assert!(!md.contains("## Historical Trend"));
  }
}
