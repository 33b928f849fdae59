//! Structured error types for the validator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidatorError {
  #[error("schema: {0}")]
  Schema(String),

  #[error("unknown repository type: {0}")]
  UnknownType(String),

  #[error("repository not found: {0}")]
  RepoNotFound(String),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl ValidatorError {
  pub fn schema(msg: impl Into<String>) -> Self {
    Self::Schema(msg.into())
  }
}
