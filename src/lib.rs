//! 10 km training plan generator
//!
//! The core (`physiology`, `sessions`, `generator`) is pure and synchronous.
//! `storage` and `weather` are collaborators working on finished plans.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod models;
pub mod physiology;
pub mod sessions;
pub mod storage;
pub mod weather;

#[cfg(test)]
pub mod test_utils;

pub use config::AppConfig;
pub use db::AppState;
pub use error::{ValidationError, ValidationResult};
pub use generator::generate;
pub use models::{
  Plan, PlanParameters, PlanProgress, RunnerProfile, Session, SessionStatus, SessionType, Sex, Vma,
  Week,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();
}

/// Read configuration from the environment and open the database
pub async fn initialize() -> Result<AppState, Box<dyn std::error::Error>> {
  let config = AppConfig::from_env()?;
  let db = db::initialize_db(&config.db_path).await?;
  tracing::info!("Database ready");

  Ok(AppState { db, config })
}
