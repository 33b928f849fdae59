//! History stores: the narrow read/append contract plus two local backends.
//!
//! Snapshots are keyed by `(repo_name, timestamp)` and never mutated. Reads
//! return newest-first.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::types::HistorySnapshot;

/// Snapshots kept per repository by the JSON file store.
pub const DEFAULT_RETENTION: usize = 100;

pub trait HistoryStore {
  /// Append one snapshot. Must be atomic: readers never see a partial write.
  fn append(&mut self, repo: &str, snapshot: &HistorySnapshot) -> Result<(), StoreError>;

  /// Most recent `limit` snapshots, newest first.
  fn recent(&self, repo: &str, limit: usize) -> Result<Vec<HistorySnapshot>, StoreError>;

  /// All snapshots strictly newer than `cutoff`, newest first.
  fn since(&self, repo: &str, cutoff: DateTime<Utc>) -> Result<Vec<HistorySnapshot>, StoreError>;

  /// Distinct repository names known to the store, sorted.
  fn repositories(&self) -> Result<Vec<String>, StoreError>;
}

/// Timestamp reader for stored snapshots: RFC 3339, or an offset-less ISO
/// 8601 datetime (older single-repository files) taken as UTC.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  parse_timestamp(&raw).ok_or_else(|| {
    serde::de::Error::custom(format!("invalid timestamp {:?}", raw))
  })
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
    return Some(ts.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
    .ok()
    .map(|naive| naive.and_utc())
}

/// Per-repository series, oldest → newest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Ledger {
  #[serde(default)]
  repositories: BTreeMap<String, Vec<HistorySnapshot>>,
}

impl Ledger {
  fn push(&mut self, repo: &str, snapshot: &HistorySnapshot, retention: Option<usize>) {
    let series = self.repositories.entry(repo.to_string()).or_default();
    // Keep timestamp order even if the caller's clock went backwards.
    let at = series.partition_point(|s| s.timestamp <= snapshot.timestamp);
    series.insert(at, snapshot.clone());
    if let Some(cap) = retention {
      let excess = series.len().saturating_sub(cap);
      series.drain(..excess);
    }
  }

  fn recent(&self, repo: &str, limit: usize) -> Vec<HistorySnapshot> {
    self
      .repositories
      .get(repo)
      .map(|series| series.iter().rev().take(limit).cloned().collect())
      .unwrap_or_default()
  }

  fn since(&self, repo: &str, cutoff: DateTime<Utc>) -> Vec<HistorySnapshot> {
    self
      .repositories
      .get(repo)
      .map(|series| {
        series
          .iter()
          .rev()
          .filter(|s| s.timestamp > cutoff)
          .cloned()
          .collect()
      })
      .unwrap_or_default()
  }

  fn names(&self) -> Vec<String> {
    self.repositories.keys().cloned().collect()
  }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Unbounded in-process store. Used by tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  ledger: Ledger,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl HistoryStore for MemoryStore {
  fn append(&mut self, repo: &str, snapshot: &HistorySnapshot) -> Result<(), StoreError> {
    self.ledger.push(repo, snapshot, None);
    Ok(())
  }

  fn recent(&self, repo: &str, limit: usize) -> Result<Vec<HistorySnapshot>, StoreError> {
    Ok(self.ledger.recent(repo, limit))
  }

  fn since(&self, repo: &str, cutoff: DateTime<Utc>) -> Result<Vec<HistorySnapshot>, StoreError> {
    Ok(self.ledger.since(repo, cutoff))
  }

  fn repositories(&self) -> Result<Vec<String>, StoreError> {
    Ok(self.ledger.names())
  }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// Single JSON document holding every repository's series.
///
/// Appends rewrite the document through a temp file in the same directory and
/// rename it over the original. A bare JSON array (single-repository history)
/// is accepted on read and filed under the store's default repository name.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
  path: PathBuf,
  retention: usize,
  legacy_repo: String,
}

impl JsonFileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      retention: DEFAULT_RETENTION,
      legacy_repo: "default".to_string(),
    }
  }

  pub fn with_retention(mut self, retention: usize) -> Self {
    self.retention = retention.max(1);
    self
  }

  /// Repository name to file a legacy single-series history under.
  pub fn with_legacy_repo(mut self, repo: impl Into<String>) -> Self {
    self.legacy_repo = repo.into();
    self
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn load(&self) -> Result<Ledger, StoreError> {
    let raw = match fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Ledger::default()),
      Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
      return Ok(Ledger::default());
    }
    // Layout is chosen by the first token.
    if raw.trim_start().starts_with('[') {
      let mut series: Vec<HistorySnapshot> = serde_json::from_str(&raw)?;
      series.sort_by_key(|s| s.timestamp);
      let mut ledger = Ledger::default();
      ledger.repositories.insert(self.legacy_repo.clone(), series);
      return Ok(ledger);
    }
    Ok(serde_json::from_str(&raw)?)
  }

  fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
    let dir = match self.path.parent() {
      Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
      _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    let tmp = NamedTempFile::new_in(&dir)?;
    {
      let mut writer = BufWriter::new(tmp.as_file());
      serde_json::to_writer_pretty(&mut writer, ledger)?;
      writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
  }
}

impl HistoryStore for JsonFileStore {
  fn append(&mut self, repo: &str, snapshot: &HistorySnapshot) -> Result<(), StoreError> {
    let mut ledger = self.load()?;
    ledger.push(repo, snapshot, Some(self.retention));
    self.save(&ledger)
  }

  fn recent(&self, repo: &str, limit: usize) -> Result<Vec<HistorySnapshot>, StoreError> {
    Ok(self.load()?.recent(repo, limit))
  }

  fn since(&self, repo: &str, cutoff: DateTime<Utc>) -> Result<Vec<HistorySnapshot>, StoreError> {
    Ok(self.load()?.since(repo, cutoff))
  }

  fn repositories(&self) -> Result<Vec<String>, StoreError> {
    Ok(self.load()?.names())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{ComplianceLevel, HealthGrade};
  use chrono::{Duration, TimeZone};

  fn snap(hour: u32, overall: f64) -> HistorySnapshot {
    HistorySnapshot {
      timestamp: Utc.with_ymd_and_hms(2025, 2, 1, hour, 0, 0).unwrap(),
      overall_score: overall,
      compliance_level: ComplianceLevel::Tested,
      health_grade: HealthGrade::C,
      category_scores: BTreeMap::new(),
      trend_analysis: BTreeMap::new(),
      violations_count: 0,
    }
  }

  #[test]
  fn memory_store_reads_newest_first() {
    let mut store = MemoryStore::new();
    for (h, s) in [(1, 0.1), (2, 0.2), (3, 0.3)] {
      store.append("r", &snap(h, s)).unwrap();
    }
    let recent = store.recent("r", 2).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].overall_score, 0.3);
    assert_eq!(recent[1].overall_score, 0.2);
    assert!(store.recent("other", 5).unwrap().is_empty());
  }

  #[test]
  fn out_of_order_append_keeps_timestamp_order() {
    let mut store = MemoryStore::new();
    store.append("r", &snap(5, 0.5)).unwrap();
    store.append("r", &snap(2, 0.2)).unwrap();
    let recent = store.recent("r", 5).unwrap();
    assert_eq!(recent[0].overall_score, 0.5);
  }

  #[test]
  fn since_is_strictly_newer_than_cutoff() {
    let mut store = MemoryStore::new();
    for h in 1..=4 {
      store.append("r", &snap(h, h as f64 / 10.0)).unwrap();
    }
    let cutoff = snap(2, 0.0).timestamp;
    let newer = store.since("r", cutoff).unwrap();
    let scores: Vec<f64> = newer.iter().map(|s| s.overall_score).collect();
    assert_eq!(scores, vec![0.4, 0.3]);
  }

  #[test]
  fn repositories_are_distinct_and_sorted() {
    let mut store = MemoryStore::new();
    store.append("beta", &snap(1, 0.1)).unwrap();
    store.append("alpha", &snap(1, 0.1)).unwrap();
    store.append("beta", &snap(2, 0.1)).unwrap();
    assert_eq!(store.repositories().unwrap(), vec!["alpha", "beta"]);
  }

  #[test]
  fn json_store_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let mut store = JsonFileStore::new(&path);
    store.append("repo", &snap(1, 0.4)).unwrap();
    store.append("repo", &snap(2, 0.6)).unwrap();

    let reopened = JsonFileStore::new(&path);
    let recent = reopened.recent("repo", 5).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].overall_score, 0.6);
    assert_eq!(reopened.repositories().unwrap(), vec!["repo"]);
  }

  #[test]
  fn json_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));
    assert!(store.recent("repo", 5).unwrap().is_empty());
    assert!(store.repositories().unwrap().is_empty());
  }

  #[test]
  fn json_store_enforces_retention() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("h.json")).with_retention(3);
    let base = snap(0, 0.0).timestamp;
    for i in 0..5 {
      let mut s = snap(0, i as f64 / 10.0);
      s.timestamp = base + Duration::minutes(i);
      store.append("repo", &s).unwrap();
    }
    let all = store.recent("repo", 100).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].overall_score, 0.2);
  }

  #[test]
  fn json_store_reads_legacy_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    let legacy = vec![snap(1, 0.5), snap(2, 0.7)];
    fs::write(&path, serde_json::to_string(&legacy).unwrap()).unwrap();

    let store = JsonFileStore::new(&path).with_legacy_repo("fcm-core");
    let recent = store.recent("fcm-core", 5).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].overall_score, 0.7);
  }

  // Layout written by the single-repository scorer: a bare array, local
  // timestamps without an offset, no violation count.
  const SINGLE_REPO_HISTORY: &str = r#"[
  {
    "timestamp": "2025-01-10T08:00:00.123456",
    "overall_score": 0.62,
    "compliance_level": "tested",
    "health_grade": "C+",
    "category_scores": {
      "structural_health": 0.7,
      "content_health": 0.6,
      "process_health": 0.5,
      "security_health": 0.5,
      "evolution_health": 0.91
    },
    "trend_analysis": {"overall": "insufficient_data"}
  },
  {
    "timestamp": "2025-01-11T08:00:00",
    "overall_score": 0.71,
    "compliance_level": "tested",
    "health_grade": "B-",
    "category_scores": {"structural_health": 0.8},
    "trend_analysis": {"overall": "improving", "structural_health": "improving"}
  }
]"#;

  #[test]
  fn offset_less_timestamps_read_as_utc() {
    let expected = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
    assert_eq!(parse_timestamp("2025-01-10T08:00:00"), Some(expected));
    assert_eq!(parse_timestamp("2025-01-10T08:00:00Z"), Some(expected));
    assert_eq!(parse_timestamp("2025-01-10T10:00:00+02:00"), Some(expected));
    let fractional = parse_timestamp("2025-01-10T08:00:00.123456").unwrap();
    assert_eq!(fractional.timestamp_subsec_micros(), 123_456);
    assert_eq!(parse_timestamp("yesterday"), None);
  }

  #[test]
  fn json_store_reads_and_migrates_single_repo_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compliance_history.json");
    fs::write(&path, SINGLE_REPO_HISTORY).unwrap();

    let mut store = JsonFileStore::new(&path).with_legacy_repo("fcm-lab");
    let recent = store.recent("fcm-lab", 5).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].overall_score, 0.71);
    assert_eq!(recent[1].health_grade, HealthGrade::CPlus);
    assert_eq!(recent[1].violations_count, 0);

    // The next append rewrites the file in the ledger layout.
    let mut next = snap(9, 0.75);
    next.timestamp = Utc.with_ymd_and_hms(2025, 1, 12, 8, 0, 0).unwrap();
    store.append("fcm-lab", &next).unwrap();
    let rewritten = fs::read_to_string(&path).unwrap();
    assert!(rewritten.trim_start().starts_with('{'));

    let reopened = JsonFileStore::new(&path);
    let all = reopened.recent("fcm-lab", 10).unwrap();
    let scores: Vec<f64> = all.iter().map(|s| s.overall_score).collect();
    assert_eq!(scores, vec![0.75, 0.71, 0.62]);
  }

  #[test]
  fn bad_legacy_timestamp_names_the_problem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    fs::write(
      &path,
      r#"[{"timestamp": "last tuesday", "overall_score": 0.5,
           "compliance_level": "documented", "health_grade": "D"}]"#,
    )
    .unwrap();
    let err = JsonFileStore::new(&path).recent("default", 1).unwrap_err();
    assert!(err.to_string().contains("invalid timestamp"), "{}", err);
  }

  #[test]
  fn json_store_corrupt_file_is_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{ nope").unwrap();
    let store = JsonFileStore::new(&path);
    assert!(matches!(store.recent("r", 1), Err(StoreError::Json(_))));
  }
}
