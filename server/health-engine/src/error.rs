//! Structured error types for the health engine.

use thiserror::Error;

/// Rejected configuration. Raised at load time, before any score is computed.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config: {field}: {reason}")]
  Invalid { field: String, reason: String },

  #[error("config io: {0}")]
  Io(#[from] std::io::Error),

  #[error("config json: {0}")]
  Json(#[from] serde_json::Error),
}

impl ConfigError {
  pub fn invalid(field: &str, reason: &str) -> Self {
    Self::Invalid {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }
}

/// History store read/append failure. Never prevents a score from being returned.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("store io: {0}")]
  Io(#[from] std::io::Error),

  #[error("store json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("store: {0}")]
  Backend(String),
}

impl StoreError {
  pub fn backend(msg: impl Into<String>) -> Self {
    Self::Backend(msg.into())
  }
}

/// Top-level error for callers driving the engine end to end (CLI, services).
#[derive(Debug, Error)]
pub enum EngineError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }
}
