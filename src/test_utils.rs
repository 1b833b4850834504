//! Test utilities shared by the unit tests
//!
//! - in-memory database with migrations applied
//! - runner profile and plan parameter factories
//! - float comparison macro

use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::AppState;
use crate::models::{PlanParameters, RunnerProfile, Sex, Vma};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Application state over a test pool with default configuration
pub fn test_state(pool: &SqlitePool) -> Arc<AppState> {
  Arc::new(AppState {
    db: pool.clone(),
    config: AppConfig::default(),
  })
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Valid profile (BMI 22.9, HR 50/190) with the given VMA and weekly volume
pub fn mock_profile(vma: f64, weekly_volume_km: f64) -> RunnerProfile {
  RunnerProfile {
    first_name: "Jane".to_string(),
    last_name: "Runner".to_string(),
    city: Some("Lyon".to_string()),
    age: 34,
    sex: Sex::Female,
    height_cm: 175.0,
    weight_kg: 70.0,
    vma: Vma::new(vma).expect("mock VMA out of range"),
    max_hr: 190,
    rest_hr: 50,
    weekly_volume_km,
  }
}

/// Monday 2 November 2026
pub fn mock_start_date() -> NaiveDate {
  NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
}

pub fn mock_params(duration_weeks: u32, target_time: Option<&str>) -> PlanParameters {
  PlanParameters::new(duration_weeks, mock_start_date(), target_time.map(str::to_string))
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Datelike;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles")
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(count, 0);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_profile_is_valid() {
    let profile = mock_profile(12.0, 30.0);
    assert!(profile.validate().is_ok());
    assert_eq!(mock_start_date().weekday(), chrono::Weekday::Mon);
  }
}
