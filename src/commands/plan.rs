use crate::db::AppState;
use crate::generator;
use crate::models::{Plan, PlanParameters, PlanProgress, RunnerProfile, SessionStatus, Week};
use crate::physiology;
use crate::storage::{self, ProfileSummary, SavedProfile};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// ---------------------------------------------------------------------------
/// Plan Generation
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GeneratedPlan {
  /// Set when the plan was saved
  pub slug: Option<String>,
  pub plan: Plan,
  pub progress: PlanProgress,
}

/// Generate a plan for the profile, optionally saving profile and plan together
pub async fn generate_plan(
  state: &AppState,
  profile: RunnerProfile,
  params: PlanParameters,
  save: bool,
) -> Result<GeneratedPlan, String> {
  let plan = generator::generate(&profile, &params).map_err(|e| e.to_string())?;

  let slug = if save {
    let slug = storage::save_profile(&state.db, &profile, Some(&plan))
      .await
      .map_err(|e| e.to_string())?;
    info!("Plan saved for {}", slug);
    Some(slug)
  } else {
    None
  };

  Ok(GeneratedPlan {
    slug,
    progress: PlanProgress::compute(&plan),
    plan,
  })
}

/// ---------------------------------------------------------------------------
/// Stored Profiles
/// ---------------------------------------------------------------------------

pub async fn list_profiles(state: &AppState) -> Result<Vec<ProfileSummary>, String> {
  storage::list_profiles(&state.db)
    .await
    .map_err(|e| format!("Failed to list profiles: {}", e))
}

pub async fn get_profile(state: &AppState, slug: &str) -> Result<SavedProfile, String> {
  storage::load_profile(&state.db, slug)
    .await
    .map_err(|e| e.to_string())
}

pub async fn delete_profile(state: &AppState, slug: &str) -> Result<(), String> {
  storage::delete_profile(&state.db, slug)
    .await
    .map_err(|e| e.to_string())
}

/// Record a session outcome and return the updated progress
pub async fn mark_session(
  state: &AppState,
  slug: &str,
  date: NaiveDate,
  status: SessionStatus,
  reason: &str,
) -> Result<PlanProgress, String> {
  storage::update_session_status(&state.db, slug, date, status, reason)
    .await
    .map_err(|e| e.to_string())?;

  let saved = get_profile(state, slug).await?;
  let plan = saved
    .plan
    .ok_or_else(|| format!("No plan stored for {}", slug))?;
  Ok(PlanProgress::compute(&plan))
}

/// Swap two days of a stored week (days 0-6 from the week's first day)
pub async fn swap_days(
  state: &AppState,
  slug: &str,
  week_number: u32,
  a: usize,
  b: usize,
) -> Result<Week, String> {
  storage::swap_sessions(&state.db, slug, week_number, a, b)
    .await
    .map_err(|e| e.to_string())
}

/// ---------------------------------------------------------------------------
/// Profile Report
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ProfileReport {
  pub full_name: String,
  pub bmi: f64,
  pub vo2max: f64,
  pub easy_pace: String,
  pub threshold_pace: String,
  pub specific_pace: String,
  pub vma_pace: String,
  pub recovery_walk_pace: String,
}

pub fn profile_report(profile: &RunnerProfile) -> Result<ProfileReport, String> {
  let vma = profile.vma.kmh();
  Ok(ProfileReport {
    full_name: profile.full_name(),
    bmi: profile.bmi().map_err(|e| e.to_string())?,
    vo2max: physiology::estimate_vo2max(vma),
    easy_pace: physiology::easy_pace_range(vma),
    threshold_pace: physiology::threshold_pace_range(vma),
    specific_pace: physiology::specific_pace_range(vma),
    vma_pace: physiology::vma_pace_range(vma),
    recovery_walk_pace: physiology::recovery_walk_pace_range(),
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
