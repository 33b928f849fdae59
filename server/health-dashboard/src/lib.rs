//! Repository Health Dashboard
//!
//! HTTP service that scores repositories with health-engine and keeps every
//! run as a snapshot in PostgreSQL. Bind to 127.0.0.1 by default (internal only).

mod date;
mod error;
mod handlers;
mod report;
mod settings;
mod state;
mod store;
mod types;

use axum::{
  routing::{get, post},
  Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use error::ServiceError;
pub use handlers::{health, history, org_report, repo_report, repos, score, summary};
pub use settings::Settings;
pub use state::AppState;
pub use store::{PgHistoryStore, SnapshotRow};

/// All routes over shared state.
pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/score", post(score))
    .route("/repos", get(repos))
    .route("/repos/:name/history", get(history))
    .route("/repos/:name/report", get(repo_report))
    .route("/summary", get(summary))
    .route("/report", get(org_report))
    .layer(CorsLayer::permissive())
    .with_state(state)
}
