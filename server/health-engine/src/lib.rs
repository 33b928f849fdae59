//! Repository Health Scoring Engine — deterministic, rule-based.
//!
//! Turns four measured category scores into per-category status, an overall
//! score, a compliance level and letter grade, a trend classification from
//! prior snapshots, and an ordered list of recommendations.
//!
//! Pure computation; the only side effect is one append to a caller-supplied
//! history store.

pub mod category;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod org;
pub mod recommend;
pub mod report;
pub mod store;
pub mod trend;
pub mod types;

pub use config::{Config, MetricDefinition, Thresholds};
pub use engine::{Engine, ScoringOutcome};
pub use error::{ConfigError, EngineError, StoreError};
pub use store::{HistoryStore, JsonFileStore, MemoryStore};
pub use types::{
  Category, CategoryScore, ComplianceLevel, ComplianceScore, HealthGrade, HealthMetric,
  HistorySnapshot, RawScores, ScoreRequest, Status, Trend,
};
