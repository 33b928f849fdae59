//! Plain-text summary of one score, for `--format summary`.

use std::fmt::Write;

use crate::recommend::display_name;
use crate::types::ComplianceScore;

pub fn summary(score: &ComplianceScore) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "# Repository Compliance Report");
  let _ = writeln!(out);
  let _ = writeln!(
    out,
    "**Overall Score:** {:.2} ({})",
    score.overall_score, score.health_grade
  );
  let _ = writeln!(
    out,
    "**Compliance Level:** {}",
    score.compliance_level.as_str().to_uppercase()
  );
  let _ = writeln!(
    out,
    "**Generated:** {}",
    score.generated_at.format("%Y-%m-%d %H:%M:%S")
  );
  let _ = writeln!(out);

  let _ = writeln!(out, "## Category Scores");
  let _ = writeln!(out);
  for metric in &score.metrics {
    let _ = writeln!(
      out,
      "- **{}:** {:.2} [{}, {}]",
      display_name(&metric.name),
      metric.value,
      metric.status.as_str(),
      metric.trend.as_str()
    );
  }
  let _ = writeln!(out);

  if !score.recommendations.is_empty() {
    let _ = writeln!(out, "## Recommendations");
    let _ = writeln!(out);
    for rec in &score.recommendations {
      let _ = writeln!(out, "- {}", rec);
    }
    let _ = writeln!(out);
  }

  let _ = writeln!(out, "## Trend Analysis");
  let _ = writeln!(out);
  for (key, trend) in &score.trend_analysis {
    let _ = writeln!(out, "- **{}:** {}", display_name(key), trend.as_str());
  }

  out
}
