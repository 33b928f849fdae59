//! Process (CI and automation) and security checks.

use std::fs;
use std::path::Path;

use crate::types::{CheckOutcome, Violation};

fn has_workflows(repo: &Path) -> bool {
  let Ok(entries) = fs::read_dir(repo.join(".github").join("workflows")) else {
    return false;
  };
  entries.filter_map(Result::ok).any(|entry| {
    let path = entry.path();
    path.is_file()
      && matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
      )
  })
}

fn any_exists(repo: &Path, candidates: &[&str]) -> bool {
  candidates.iter().any(|c| repo.join(c).exists())
}

/// Workflows, validation tooling, automation scripts.
pub fn validate_process(repo: &Path) -> CheckOutcome {
  let checks = [
    (has_workflows(repo), Violation::NoWorkflows),
    (
      any_exists(repo, &["validation", "tools"]),
      Violation::NoValidationTools,
    ),
    (
      any_exists(repo, &["scripts", "Makefile"]),
      Violation::NoAutomationScripts,
    ),
  ];
  tally(checks)
}

/// Security policy and dependency scanning.
pub fn validate_security(repo: &Path) -> CheckOutcome {
  let checks = [
    (
      any_exists(repo, &["SECURITY.md", ".github/SECURITY.md", "docs/SECURITY.md"]),
      Violation::NoSecurityPolicy,
    ),
    (
      repo.join(".github").join("dependabot.yml").exists(),
      Violation::NoDependencyScanning,
    ),
  ];
  tally(checks)
}

fn tally<const N: usize>(checks: [(bool, Violation); N]) -> CheckOutcome {
  let passed = checks.iter().filter(|(ok, _)| *ok).count();
  let violations = checks
    .into_iter()
    .filter(|(ok, _)| !ok)
    .map(|(_, v)| v)
    .collect();
  CheckOutcome::from_counts(passed, N, violations)
}
