//! Persistence of runner profiles and their plans
//!
//! One row per profile, at most one plan per profile, one row per plan day.
//! The generator never reads from here; after a plan is saved the runner can
//! only set session statuses and swap two days within a week.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::models::{
  plan::clean_text, Plan, RunnerProfile, Session, SessionStatus, SessionType, Sex, SwapError, Vma,
  Week,
};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  #[error("Database error: {0}")]
  Database(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Corrupt record: {0}")]
  Corrupt(String),

  #[error("Cannot swap sessions: {0}")]
  InvalidSwap(#[from] SwapError),
}

impl From<sqlx::Error> for StorageError {
  fn from(e: sqlx::Error) -> Self {
    StorageError::Database(e.to_string())
  }
}

impl Serialize for StorageError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Stored Records
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProfile {
  pub slug: String,
  pub profile: RunnerProfile,
  pub plan: Option<Plan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
  pub slug: String,
  pub full_name: String,
  pub plan_name: Option<String>,
}

/// Combining Diacritical Marks block, dropped after decomposition
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036F}';

/// "{last}_{first}", accents stripped, anything but ASCII letters, digits and '_' replaced by '_'
pub fn profile_slug(profile: &RunnerProfile) -> String {
  format!("{}_{}", profile.last_name.trim(), profile.first_name.trim())
    .nfd()
    .filter(|c| !COMBINING_MARKS.contains(c))
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Writes
/// ---------------------------------------------------------------------------

/// Upsert the profile; when a plan is given it replaces any stored plan
pub async fn save_profile(
  pool: &SqlitePool,
  profile: &RunnerProfile,
  plan: Option<&Plan>,
) -> Result<String, StorageError> {
  let slug = profile_slug(profile);
  let mut tx = pool.begin().await?;

  sqlx::query(
    r#"
    INSERT INTO profiles (
      slug, first_name, last_name, city, age, sex, height_cm, weight_kg,
      vma, max_hr, rest_hr, weekly_volume_km
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
    ON CONFLICT(slug) DO UPDATE SET
      first_name = excluded.first_name,
      last_name = excluded.last_name,
      city = excluded.city,
      age = excluded.age,
      sex = excluded.sex,
      height_cm = excluded.height_cm,
      weight_kg = excluded.weight_kg,
      vma = excluded.vma,
      max_hr = excluded.max_hr,
      rest_hr = excluded.rest_hr,
      weekly_volume_km = excluded.weekly_volume_km,
      updated_at = datetime('now')
    "#,
  )
  .bind(&slug)
  .bind(&profile.first_name)
  .bind(&profile.last_name)
  .bind(&profile.city)
  .bind(profile.age as i64)
  .bind(profile.sex.to_string())
  .bind(profile.height_cm)
  .bind(profile.weight_kg)
  .bind(profile.vma.kmh())
  .bind(profile.max_hr)
  .bind(profile.rest_hr)
  .bind(profile.weekly_volume_km)
  .execute(&mut *tx)
  .await?;

  if let Some(plan) = plan {
    sqlx::query("DELETE FROM plan_sessions WHERE profile_slug = ?")
      .bind(&slug)
      .execute(&mut *tx)
      .await?;
    sqlx::query("DELETE FROM plans WHERE profile_slug = ?")
      .bind(&slug)
      .execute(&mut *tx)
      .await?;

    sqlx::query(
      r#"
      INSERT INTO plans (profile_slug, name, start_date, objective, duration_weeks)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(&slug)
    .bind(&plan.name)
    .bind(plan.start_date.to_string())
    .bind(&plan.objective)
    .bind(plan.weeks.len() as i64)
    .execute(&mut *tx)
    .await?;

    for week in &plan.weeks {
      for (day, session) in week.sessions.iter().enumerate() {
        sqlx::query(
          r#"
          INSERT INTO plan_sessions (
            profile_slug, week_number, day_index, session_date, session_type,
            description, target_intensity, planned_duration_min,
            planned_distance_km, status, cancellation_reason
          )
          VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
          "#,
        )
        .bind(&slug)
        .bind(week.number as i64)
        .bind(day as i64)
        .bind(session.date.to_string())
        .bind(session.session_type.to_string())
        .bind(&session.description)
        .bind(&session.target_intensity)
        .bind(session.planned_duration_min as i64)
        .bind(session.planned_distance_km)
        .bind(session.status.to_string())
        .bind(&session.cancellation_reason)
        .execute(&mut *tx)
        .await?;
      }
    }
  }

  tx.commit().await?;
  info!("Saved profile {} (plan: {})", slug, plan.is_some());
  Ok(slug)
}

/// Record the outcome of one session of a stored plan
pub async fn update_session_status(
  pool: &SqlitePool,
  slug: &str,
  date: NaiveDate,
  status: SessionStatus,
  reason: &str,
) -> Result<(), StorageError> {
  let reason = match status {
    SessionStatus::Missed => clean_text(reason),
    SessionStatus::Planned | SessionStatus::Completed => String::new(),
  };

  let result = sqlx::query(
    r#"
    UPDATE plan_sessions
    SET status = ?1, cancellation_reason = ?2
    WHERE profile_slug = ?3 AND session_date = ?4 AND session_type != 'rest'
    "#,
  )
  .bind(status.to_string())
  .bind(&reason)
  .bind(slug)
  .bind(date.to_string())
  .execute(pool)
  .await?;

  if result.rows_affected() == 0 {
    return Err(StorageError::NotFound(format!(
      "No training session on {} for {}",
      date, slug
    )));
  }

  debug!("Session {} of {} marked {}", date, slug, status);
  Ok(())
}

/// Swap two days of a stored week and save both right away
///
/// Dates and day indices stay in place; the session content moves. Returns the
/// week as stored after the swap.
pub async fn swap_sessions(
  pool: &SqlitePool,
  slug: &str,
  week_number: u32,
  a: usize,
  b: usize,
) -> Result<Week, StorageError> {
  let plan = load_plan(pool, slug)
    .await?
    .ok_or_else(|| StorageError::NotFound(format!("No plan stored for {}", slug)))?;
  let mut week = plan
    .weeks
    .into_iter()
    .find(|w| w.number == week_number)
    .ok_or_else(|| StorageError::NotFound(format!("Week {} of {}", week_number, slug)))?;

  week.swap_days(a, b)?;

  let mut tx = pool.begin().await?;
  for day in [a, b] {
    let session = &week.sessions[day];
    sqlx::query(
      r#"
      UPDATE plan_sessions
      SET session_type = ?1, description = ?2, target_intensity = ?3,
          planned_duration_min = ?4, planned_distance_km = ?5,
          status = ?6, cancellation_reason = ?7
      WHERE profile_slug = ?8 AND week_number = ?9 AND day_index = ?10
      "#,
    )
    .bind(session.session_type.to_string())
    .bind(&session.description)
    .bind(&session.target_intensity)
    .bind(session.planned_duration_min as i64)
    .bind(session.planned_distance_km)
    .bind(session.status.to_string())
    .bind(&session.cancellation_reason)
    .bind(slug)
    .bind(week_number as i64)
    .bind(day as i64)
    .execute(&mut *tx)
    .await?;
  }
  tx.commit().await?;

  info!("Swapped days {} and {} of week {} for {}", a, b, week_number, slug);
  Ok(week)
}

pub async fn delete_profile(pool: &SqlitePool, slug: &str) -> Result<(), StorageError> {
  let mut tx = pool.begin().await?;

  sqlx::query("DELETE FROM plan_sessions WHERE profile_slug = ?")
    .bind(slug)
    .execute(&mut *tx)
    .await?;
  sqlx::query("DELETE FROM plans WHERE profile_slug = ?")
    .bind(slug)
    .execute(&mut *tx)
    .await?;
  let result = sqlx::query("DELETE FROM profiles WHERE slug = ?")
    .bind(slug)
    .execute(&mut *tx)
    .await?;

  if result.rows_affected() == 0 {
    return Err(StorageError::NotFound(format!("Profile {}", slug)));
  }

  tx.commit().await?;
  info!("Deleted profile {}", slug);
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Reads
/// ---------------------------------------------------------------------------

pub async fn profile_exists(pool: &SqlitePool, slug: &str) -> Result<bool, StorageError> {
  let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM profiles WHERE slug = ?")
    .bind(slug)
    .fetch_optional(pool)
    .await?;
  Ok(row.is_some())
}

pub async fn list_profiles(pool: &SqlitePool) -> Result<Vec<ProfileSummary>, StorageError> {
  let rows: Vec<(String, String, String, Option<String>)> = sqlx::query_as(
    r#"
    SELECT p.slug, p.first_name, p.last_name, pl.name
    FROM profiles p
    LEFT JOIN plans pl ON pl.profile_slug = p.slug
    ORDER BY p.last_name, p.first_name
    "#,
  )
  .fetch_all(pool)
  .await?;

  Ok(
    rows
      .into_iter()
      .map(|(slug, first, last, plan_name)| ProfileSummary {
        slug,
        full_name: format!("{} {}", first, last),
        plan_name,
      })
      .collect(),
  )
}

pub async fn load_profile(pool: &SqlitePool, slug: &str) -> Result<SavedProfile, StorageError> {
  let row = sqlx::query(
    r#"
    SELECT first_name, last_name, city, age, sex, height_cm, weight_kg,
           vma, max_hr, rest_hr, weekly_volume_km
    FROM profiles
    WHERE slug = ?
    "#,
  )
  .bind(slug)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| StorageError::NotFound(format!("Profile {}", slug)))?;

  let sex_str: String = row.get("sex");
  let sex: Sex = sex_str.parse().map_err(StorageError::Corrupt)?;
  let vma = Vma::new(row.get("vma")).map_err(|e| StorageError::Corrupt(e.to_string()))?;
  let age: i64 = row.get("age");

  let profile = RunnerProfile {
    first_name: row.get("first_name"),
    last_name: row.get("last_name"),
    city: row.get("city"),
    age: age as u32,
    sex,
    height_cm: row.get("height_cm"),
    weight_kg: row.get("weight_kg"),
    vma,
    max_hr: row.get("max_hr"),
    rest_hr: row.get("rest_hr"),
    weekly_volume_km: row.get("weekly_volume_km"),
  };

  let plan = load_plan(pool, slug).await?;
  Ok(SavedProfile {
    slug: slug.to_string(),
    profile,
    plan,
  })
}

async fn load_plan(pool: &SqlitePool, slug: &str) -> Result<Option<Plan>, StorageError> {
  let header: Option<(String, String, String)> =
    sqlx::query_as("SELECT name, start_date, objective FROM plans WHERE profile_slug = ?")
      .bind(slug)
      .fetch_optional(pool)
      .await?;

  let Some((name, start_date, objective)) = header else {
    return Ok(None);
  };

  let rows = sqlx::query(
    r#"
    SELECT week_number, session_date, session_type, description, target_intensity,
           planned_duration_min, planned_distance_km, status, cancellation_reason
    FROM plan_sessions
    WHERE profile_slug = ?
    ORDER BY week_number, day_index
    "#,
  )
  .bind(slug)
  .fetch_all(pool)
  .await?;

  let mut weeks: Vec<Week> = Vec::new();
  for row in rows {
    let week_number: i64 = row.get("week_number");
    let session_date: String = row.get("session_date");
    let type_str: String = row.get("session_type");
    let status_str: String = row.get("status");
    let duration: i64 = row.get("planned_duration_min");

    let session = Session {
      date: parse_date(&session_date)?,
      session_type: type_str.parse::<SessionType>().map_err(StorageError::Corrupt)?,
      description: row.get("description"),
      target_intensity: row.get("target_intensity"),
      planned_duration_min: duration as u32,
      planned_distance_km: row.get("planned_distance_km"),
      status: status_str.parse::<SessionStatus>().map_err(StorageError::Corrupt)?,
      cancellation_reason: row.get("cancellation_reason"),
    };

    match weeks.last_mut() {
      Some(week) if week.number as i64 == week_number => week.sessions.push(session),
      _ => weeks.push(Week::new(week_number as u32, vec![session])),
    }
  }

  Ok(Some(Plan {
    name,
    start_date: parse_date(&start_date)?,
    objective,
    weeks,
  }))
}

fn parse_date(s: &str) -> Result<NaiveDate, StorageError> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| StorageError::Corrupt(format!("Bad date '{}': {}", s, e)))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
