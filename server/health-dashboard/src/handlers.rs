//! HTTP handlers for the dashboard service.

use axum::{
  extract::{Path, Query, State},
  http::header,
  response::IntoResponse,
  Json,
};
use chrono::Utc;
use health_engine::org::{summarize, OrgSummary};
use health_engine::{HistorySnapshot, StoreError};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::date;
use crate::error::ServiceError;
use crate::report;
use crate::state::AppState;
use crate::types::{HistoryResponse, ReposResponse, ScorePayload, ScoreResponse, WindowQuery};

const MAX_REPO_NAME: usize = 200;
const MARKDOWN: &str = "text/markdown; charset=utf-8";

pub async fn health() -> &'static str {
  "ok"
}

/// Trimmed repository name, or a 400 for empty, oversized or control characters.
pub fn validate_repo_name(raw: &str) -> Result<String, ServiceError> {
  let name = raw.trim();
  if name.is_empty() {
    return Err(ServiceError::bad_request("repo_name", "must not be empty"));
  }
  if name.chars().count() > MAX_REPO_NAME {
    return Err(ServiceError::bad_request(
      "repo_name",
      &format!("must be at most {} characters", MAX_REPO_NAME),
    ));
  }
  if name.chars().any(char::is_control) {
    return Err(ServiceError::bad_request(
      "repo_name",
      "must not contain control characters",
    ));
  }
  Ok(name.to_string())
}

/// Pair every known repository with its latest in-window snapshot.
pub fn pair_latest(
  repositories: Vec<String>,
  mut latest: BTreeMap<String, HistorySnapshot>,
) -> Vec<(String, Option<HistorySnapshot>)> {
  repositories
    .into_iter()
    .map(|repo| {
      let snapshot = latest.remove(&repo);
      (repo, snapshot)
    })
    .collect()
}

pub async fn score(
  State(state): State<Arc<AppState>>,
  Json(payload): Json<ScorePayload>,
) -> Result<Json<ScoreResponse>, ServiceError> {
  let repo_name = validate_repo_name(&payload.repo_name)?;

  let window = state.engine.config().history_window();
  let recent = state
    .store
    .recent(&repo_name, window)
    .await
    .map_err(StoreError::from);
  let mut outcome = state.engine.score_from_recent(
    &repo_name,
    &payload.health_metrics,
    payload.violations.len() as u64,
    recent,
  );
  let appended = state
    .store
    .append(&repo_name, &outcome.snapshot)
    .await
    .map_err(StoreError::from);
  outcome.record_append(&repo_name, appended);

  Ok(Json(ScoreResponse::from_outcome(repo_name, outcome)))
}

pub async fn repos(State(state): State<Arc<AppState>>) -> Result<Json<ReposResponse>, ServiceError> {
  let repositories = state.store.repositories().await?;
  Ok(Json(ReposResponse { repositories }))
}

pub async fn history(
  State(state): State<Arc<AppState>>,
  Path(name): Path<String>,
  Query(query): Query<WindowQuery>,
) -> Result<Json<HistoryResponse>, ServiceError> {
  let repo_name = validate_repo_name(&name)?;
  let days = date::window_days(query.days, state.history_days)?;
  let snapshots = state
    .store
    .since(&repo_name, date::cutoff(Utc::now(), days))
    .await?;
  Ok(Json(HistoryResponse {
    repo_name,
    days,
    snapshots,
  }))
}

async fn org_summary(state: &AppState) -> Result<OrgSummary, ServiceError> {
  let repositories = state.store.repositories().await?;
  let cutoff = date::cutoff(Utc::now(), date::SUMMARY_WINDOW_DAYS);
  let latest = state.store.latest_since(cutoff).await?;
  Ok(summarize(&pair_latest(repositories, latest)))
}

pub async fn summary(State(state): State<Arc<AppState>>) -> Result<Json<OrgSummary>, ServiceError> {
  Ok(Json(org_summary(&state).await?))
}

pub async fn org_report(
  State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
  let summary = org_summary(&state).await?;
  let body = report::org_dashboard(&summary, Utc::now());
  Ok(([(header::CONTENT_TYPE, MARKDOWN)], body))
}

pub async fn repo_report(
  State(state): State<Arc<AppState>>,
  Path(name): Path<String>,
  Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, ServiceError> {
  let repo_name = validate_repo_name(&name)?;
  let days = date::window_days(query.days, state.history_days)?;
  let history = state
    .store
    .since(&repo_name, date::cutoff(Utc::now(), days))
    .await?;
  let body = report::repository_report(&repo_name, days, &history);
  Ok(([(header::CONTENT_TYPE, MARKDOWN)], body))
}
