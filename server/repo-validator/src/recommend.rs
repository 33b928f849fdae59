//! Violations to actionable recommendations; compliance level bands.

use std::collections::BTreeSet;

use crate::types::{ComplianceLevel, Violation};

fn recommendation(violation: &Violation) -> Option<String> {
  match violation {
    Violation::MissingDirectory(dir) => Some(format!("Create directory: mkdir -p {}", dir)),
    Violation::MissingFile(file) => Some(format!("Create file: touch {}", file)),
    Violation::ReadmeTooShort(_)
    | Violation::ReadmeMissingSections
    | Violation::ReadmeUnreadable(_) => {
      Some("Improve README.md: Add title, description, and usage sections".into())
    }
    Violation::ManifestMissingField(_)
    | Violation::ManifestInvalidJson(_)
    | Violation::ManifestUnreadable(_) => {
      Some("Fix fcm.manifest.json: Ensure all required fields are present".into())
    }
    Violation::ModelFileNaming(_) => {
      Some("Fix naming: Use kebab-case for files, lowercase for directories".into())
    }
    _ => None,
  }
}

/// One recommendation per distinct fix, sorted.
pub fn recommendations(violations: &[Violation]) -> Vec<String> {
  violations
    .iter()
    .filter_map(recommendation)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// Exemplary requires a clean run; lower bands ignore the violation count.
pub fn compliance_level(score: f64, violation_count: usize) -> ComplianceLevel {
  if score >= 0.9 && violation_count == 0 {
    ComplianceLevel::Exemplary
  } else if score >= 0.8 {
    ComplianceLevel::Secure
  } else if score >= 0.6 {
    ComplianceLevel::Tested
  } else if score >= 0.4 {
    ComplianceLevel::Documented
  } else if score >= 0.2 {
    ComplianceLevel::Structured
  } else {
    ComplianceLevel::Basic
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deduplicated_and_sorted() {
    let recs = recommendations(&[
      Violation::MissingFile("README.md".into()),
      Violation::ReadmeTooShort(100),
      Violation::ReadmeMissingSections,
      Violation::MissingDirectory("docs".into()),
      Violation::NoWorkflows,
    ]);
    assert_eq!(
      recs,
      vec![
        "Create directory: mkdir -p docs",
        "Create file: touch README.md",
        "Improve README.md: Add title, description, and usage sections",
      ]
    );
  }

  #[test]
  fn process_violations_have_no_fix() {
    assert!(recommendations(&[Violation::NoSecurityPolicy, Violation::NoDependencyScanning])
      .is_empty());
  }

  #[test]
  fn level_bands() {
    assert_eq!(compliance_level(0.95, 0), ComplianceLevel::Exemplary);
    assert_eq!(compliance_level(0.95, 1), ComplianceLevel::Secure);
    assert_eq!(compliance_level(0.6, 3), ComplianceLevel::Tested);
    assert_eq!(compliance_level(0.4, 0), ComplianceLevel::Documented);
    assert_eq!(compliance_level(0.2, 0), ComplianceLevel::Structured);
    assert_eq!(compliance_level(0.19, 0), ComplianceLevel::Basic);
  }
}
