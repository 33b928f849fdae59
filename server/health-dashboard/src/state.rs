//! Shared application state.

use health_engine::Engine;

use crate::store::PgHistoryStore;

pub struct AppState {
  pub store: PgHistoryStore,
  pub engine: Engine,
  /// Default `days` for history and report endpoints.
  pub history_days: i64,
}
