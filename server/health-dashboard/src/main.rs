//! Binary entrypoint for the health dashboard.

use health_engine::{Config, Engine};
use sqlx_postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use health_dashboard::{router, AppState, PgHistoryStore, Settings};

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer())
    .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  init_tracing();
  let settings = Settings::from_env()?;
  let config = match &settings.engine_config {
    Some(path) => Config::load(path)?,
    None => Config::default(),
  };
  let engine = Engine::new(config)?;

  let pool = PgPoolOptions::new()
    .max_connections(5)
    .connect(&settings.database_url)
    .await?;
  let store = PgHistoryStore::new(pool);
  store.init_schema().await?;

  let state = Arc::new(AppState {
    store,
    engine,
    history_days: settings.history_days,
  });

  let addr = SocketAddr::from(([127, 0, 0, 1], settings.port));
  info!(%addr, "health-dashboard listening");

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, router(state)).await?;

  Ok(())
}
