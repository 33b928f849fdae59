//! Service settings from environment variables.

use std::path::PathBuf;

use crate::date::MAX_WINDOW_DAYS;
use crate::error::ServiceError;

pub const DEFAULT_PORT: u16 = 5004;
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub database_url: String,
  pub port: u16,
  pub history_days: i64,
  /// Metric catalog JSON for the engine; built-in catalog when unset.
  pub engine_config: Option<PathBuf>,
}

impl Settings {
  pub fn from_env() -> Result<Self, ServiceError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from any key lookup.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServiceError> {
    let database_url = lookup("DATABASE_URL")
      .filter(|v| !v.trim().is_empty())
      .ok_or_else(|| ServiceError::Env("DATABASE_URL must be set".into()))?;

    let port = match lookup("PORT") {
      Some(raw) => raw
        .trim()
        .parse::<u16>()
        .map_err(|_| ServiceError::Env(format!("PORT must be a valid u16, got {:?}", raw)))?,
      None => DEFAULT_PORT,
    };

    let history_days = match lookup("HISTORY_DAYS") {
      Some(raw) => raw
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|d| (1..=MAX_WINDOW_DAYS).contains(d))
        .ok_or_else(|| {
          ServiceError::Env(format!(
            "HISTORY_DAYS must be between 1 and {}, got {:?}",
            MAX_WINDOW_DAYS, raw
          ))
        })?,
      None => DEFAULT_HISTORY_DAYS,
    };

    let engine_config = lookup("HEALTH_CONFIG")
      .filter(|v| !v.trim().is_empty())
      .map(PathBuf::from);

    Ok(Self {
      database_url,
      port,
      history_days,
      engine_config,
    })
  }
}
