//! PostgreSQL snapshot history.
//!
//! One row per scoring run in `health_snapshots`. Category scores and the
//! trend analysis are JSON text so custom metric catalogs round-trip.

use chrono::{DateTime, Utc};
use health_engine::{ComplianceLevel, HealthGrade, HistorySnapshot};
use sqlx_core::query::query;
use sqlx_core::row::Row;
use sqlx_postgres::{PgPool, PgRow, Postgres};
use std::collections::BTreeMap;

use crate::error::ServiceError;

const CREATE_TABLE: &str = r#"
  CREATE TABLE IF NOT EXISTS health_snapshots (
    id BIGSERIAL PRIMARY KEY,
    repo_name TEXT NOT NULL,
    recorded_at TIMESTAMPTZ NOT NULL,
    overall_score DOUBLE PRECISION NOT NULL,
    compliance_level TEXT NOT NULL,
    health_grade TEXT NOT NULL,
    category_scores TEXT NOT NULL DEFAULT '{}',
    trend_analysis TEXT NOT NULL DEFAULT '{}',
    violations_count BIGINT NOT NULL DEFAULT 0
  )
"#;

const CREATE_INDEX: &str = r#"
  CREATE INDEX IF NOT EXISTS health_snapshots_repo_time
    ON health_snapshots (repo_name, recorded_at DESC)
"#;

const COLUMNS: &str = "repo_name, recorded_at, overall_score, compliance_level, health_grade, \
                       category_scores, trend_analysis, violations_count";

/// Column values for one snapshot row.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
  pub repo_name: String,
  pub recorded_at: DateTime<Utc>,
  pub overall_score: f64,
  pub compliance_level: String,
  pub health_grade: String,
  pub category_scores: String,
  pub trend_analysis: String,
  pub violations_count: i64,
}

impl SnapshotRow {
  pub fn from_snapshot(repo_name: &str, snapshot: &HistorySnapshot) -> Result<Self, ServiceError> {
    Ok(Self {
      repo_name: repo_name.to_string(),
      recorded_at: snapshot.timestamp,
      overall_score: snapshot.overall_score,
      compliance_level: snapshot.compliance_level.as_str().to_string(),
      health_grade: snapshot.health_grade.as_str().to_string(),
      category_scores: serde_json::to_string(&snapshot.category_scores)?,
      trend_analysis: serde_json::to_string(&snapshot.trend_analysis)?,
      violations_count: i64::try_from(snapshot.violations_count).unwrap_or(i64::MAX),
    })
  }

  fn from_pg(row: &PgRow) -> Result<Self, sqlx_core::Error> {
    Ok(Self {
      repo_name: row.try_get("repo_name")?,
      recorded_at: row.try_get("recorded_at")?,
      overall_score: row.try_get("overall_score")?,
      compliance_level: row.try_get("compliance_level")?,
      health_grade: row.try_get("health_grade")?,
      category_scores: row.try_get("category_scores")?,
      trend_analysis: row.try_get("trend_analysis")?,
      violations_count: row.try_get("violations_count")?,
    })
  }

  pub fn into_snapshot(self) -> Result<(String, HistorySnapshot), ServiceError> {
    let compliance_level = ComplianceLevel::from_str_loose(&self.compliance_level)
      .ok_or_else(|| {
        ServiceError::CorruptRow(format!("compliance_level {:?}", self.compliance_level))
      })?;
    let health_grade = HealthGrade::from_str_loose(&self.health_grade)
      .ok_or_else(|| ServiceError::CorruptRow(format!("health_grade {:?}", self.health_grade)))?;

    let snapshot = HistorySnapshot {
      timestamp: self.recorded_at,
      overall_score: self.overall_score,
      compliance_level,
      health_grade,
      category_scores: serde_json::from_str(&self.category_scores)?,
      trend_analysis: serde_json::from_str(&self.trend_analysis)?,
      violations_count: u64::try_from(self.violations_count).unwrap_or(0),
    };
    Ok((self.repo_name, snapshot))
  }
}

fn decode(rows: &[PgRow]) -> Result<Vec<HistorySnapshot>, ServiceError> {
  rows
    .iter()
    .map(|row| -> Result<HistorySnapshot, ServiceError> {
      let (_, snapshot) = SnapshotRow::from_pg(row)?.into_snapshot()?;
      Ok(snapshot)
    })
    .collect()
}

/// Async history store over a connection pool.
#[derive(Debug, Clone)]
pub struct PgHistoryStore {
  pool: PgPool,
}

impl PgHistoryStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Create the table and index if missing.
  pub async fn init_schema(&self) -> Result<(), ServiceError> {
    query::<Postgres>(CREATE_TABLE).execute(&self.pool).await?;
    query::<Postgres>(CREATE_INDEX).execute(&self.pool).await?;
    Ok(())
  }

  pub async fn append(&self, repo_name: &str, snapshot: &HistorySnapshot) -> Result<(), ServiceError> {
    let row = SnapshotRow::from_snapshot(repo_name, snapshot)?;
    let sql = format!(
      "INSERT INTO health_snapshots ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
      COLUMNS
    );
    query::<Postgres>(&sql)
      .bind(row.repo_name)
      .bind(row.recorded_at)
      .bind(row.overall_score)
      .bind(row.compliance_level)
      .bind(row.health_grade)
      .bind(row.category_scores)
      .bind(row.trend_analysis)
      .bind(row.violations_count)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  /// Up to `limit` snapshots, newest first.
  pub async fn recent(&self, repo_name: &str, limit: usize) -> Result<Vec<HistorySnapshot>, ServiceError> {
    let sql = format!(
      "SELECT {} FROM health_snapshots WHERE repo_name = $1 \
       ORDER BY recorded_at DESC, id DESC LIMIT $2",
      COLUMNS
    );
    let rows = query::<Postgres>(&sql)
      .bind(repo_name)
      .bind(i64::try_from(limit).unwrap_or(i64::MAX))
      .fetch_all(&self.pool)
      .await?;
    decode(&rows)
  }

  /// Snapshots strictly newer than `cutoff`, newest first.
  pub async fn since(
    &self,
    repo_name: &str,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<HistorySnapshot>, ServiceError> {
    let sql = format!(
      "SELECT {} FROM health_snapshots WHERE repo_name = $1 AND recorded_at > $2 \
       ORDER BY recorded_at DESC, id DESC",
      COLUMNS
    );
    let rows = query::<Postgres>(&sql)
      .bind(repo_name)
      .bind(cutoff)
      .fetch_all(&self.pool)
      .await?;
    decode(&rows)
  }

  /// Distinct repository names, sorted.
  pub async fn repositories(&self) -> Result<Vec<String>, ServiceError> {
    let rows = query::<Postgres>(
      "SELECT DISTINCT repo_name FROM health_snapshots ORDER BY repo_name",
    )
    .fetch_all(&self.pool)
    .await?;
    rows
      .iter()
      .map(|row| row.try_get::<String, _>("repo_name").map_err(ServiceError::from))
      .collect()
  }

  /// Latest snapshot per repository among those newer than `cutoff`.
  pub async fn latest_since(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<BTreeMap<String, HistorySnapshot>, ServiceError> {
    let sql = format!(
      "SELECT DISTINCT ON (repo_name) {} FROM health_snapshots WHERE recorded_at > $1 \
       ORDER BY repo_name, recorded_at DESC, id DESC",
      COLUMNS
    );
    let rows = query::<Postgres>(&sql)
      .bind(cutoff)
      .fetch_all(&self.pool)
      .await?;
    rows
      .iter()
      .map(|row| -> Result<(String, HistorySnapshot), ServiceError> {
        SnapshotRow::from_pg(row)?.into_snapshot()
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use health_engine::Trend;

  fn snapshot() -> HistorySnapshot {
    HistorySnapshot {
      timestamp: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
      overall_score: 0.71,
      compliance_level: ComplianceLevel::Tested,
      health_grade: HealthGrade::BMinus,
      category_scores: BTreeMap::from([("structural_health".to_string(), 0.8)]),
      trend_analysis: BTreeMap::from([("overall".to_string(), Trend::InsufficientData)]),
      violations_count: 4,
    }
  }

  #[test]
  fn row_columns_use_wire_names() {
    let row = SnapshotRow::from_snapshot("fcm-lab", &snapshot()).unwrap();
    assert_eq!(row.compliance_level, "tested");
    assert_eq!(row.health_grade, "B-");
    assert_eq!(row.trend_analysis, r#"{"overall":"insufficient_data"}"#);
    assert_eq!(row.violations_count, 4);
  }

  #[test]
  fn row_decodes_back_to_snapshot() {
    let original = snapshot();
    let (repo, decoded) = SnapshotRow::from_snapshot("fcm-lab", &original)
      .unwrap()
      .into_snapshot()
      .unwrap();
    assert_eq!(repo, "fcm-lab");
    assert_eq!(decoded, original);
  }

  #[test]
  fn unknown_grade_is_corrupt() {
    let mut row = SnapshotRow::from_snapshot("r", &snapshot()).unwrap();
    row.health_grade = "Z".into();
    assert!(matches!(row.into_snapshot(), Err(ServiceError::CorruptRow(_))));
  }
}
