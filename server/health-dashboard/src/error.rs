//! Service errors and their HTTP mapping.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use health_engine::types::ErrorOutput;
use health_engine::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("{field}: {reason}")]
  BadRequest { field: String, reason: String },

  #[error("environment: {0}")]
  Env(String),

  #[error("database: {0}")]
  Database(#[from] sqlx_core::Error),

  /// A stored row that no longer decodes into a snapshot.
  #[error("corrupt snapshot row: {0}")]
  CorruptRow(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl ServiceError {
  pub fn bad_request(field: &str, reason: &str) -> Self {
    Self::BadRequest {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

/// Database failures during scoring travel inside the engine's outcome.
impl From<ServiceError> for StoreError {
  fn from(e: ServiceError) -> Self {
    StoreError::backend(e.to_string())
  }
}

impl IntoResponse for ServiceError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      Self::BadRequest { field, reason } => {
        ErrorOutput::new(reason.clone()).with_field(field.clone())
      }
      other => {
        tracing::error!(error = %other, "request failed");
        ErrorOutput::new("internal error")
      }
    };
    (status, Json(body)).into_response()
  }
}
