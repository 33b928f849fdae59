//! Reporting window utilities.

use chrono::{DateTime, Duration, Utc};

use crate::error::ServiceError;

pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Window for `/summary` and `/report`: latest snapshot within one day.
pub const SUMMARY_WINDOW_DAYS: i64 = 1;

/// Validate a `days` query parameter, falling back to `default`.
pub fn window_days(requested: Option<i64>, default: i64) -> Result<i64, ServiceError> {
  let days = requested.unwrap_or(default);
  if !(1..=MAX_WINDOW_DAYS).contains(&days) {
    return Err(ServiceError::bad_request(
      "days",
      &format!("must be between 1 and {}", MAX_WINDOW_DAYS),
    ));
  }
  Ok(days)
}

/// Start of a window of `days` ending at `now`. Snapshots strictly newer count.
pub fn cutoff(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
  now - Duration::days(days)
}
