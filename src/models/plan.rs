use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: usize = 7;

/// Inputs chosen by the runner for one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanParameters {
  pub duration_weeks: u32,
  pub start_date: NaiveDate,
  /// "mm:ss" or "hh:mm:ss"; absent means Finish mode
  pub target_time: Option<String>,
}

impl PlanParameters {
  pub fn new(duration_weeks: u32, start_date: NaiveDate, target_time: Option<String>) -> Self {
    Self {
      duration_weeks,
      start_date,
      target_time,
    }
  }

  /// Blank target text counts as no target
  pub fn target(&self) -> Option<&str> {
    self
      .target_time
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
  }

  pub fn is_performance_mode(&self) -> bool {
    self.target().is_some()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
  EasyRun,
  Threshold,
  Vma,
  SpecificPace,
  PreRace,
  Race,
  Rest,
  /// Reserved, never produced by the generator
  LongRun,
}

impl SessionType {
  pub fn label(&self) -> &'static str {
    match self {
      Self::EasyRun => "Easy run",
      Self::Threshold => "Threshold",
      Self::Vma => "VMA",
      Self::SpecificPace => "10k pace",
      Self::PreRace => "Pre-race",
      Self::Race => "Race",
      Self::Rest => "Rest",
      Self::LongRun => "Long run",
    }
  }

  pub fn is_quality(&self) -> bool {
    matches!(self, Self::Threshold | Self::Vma | Self::SpecificPace)
  }
}

impl std::fmt::Display for SessionType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Self::EasyRun => "easy_run",
      Self::Threshold => "threshold",
      Self::Vma => "vma",
      Self::SpecificPace => "specific_pace",
      Self::PreRace => "pre_race",
      Self::Race => "race",
      Self::Rest => "rest",
      Self::LongRun => "long_run",
    };
    write!(f, "{}", s)
  }
}

impl std::str::FromStr for SessionType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "easy_run" => Ok(Self::EasyRun),
      "threshold" => Ok(Self::Threshold),
      "vma" => Ok(Self::Vma),
      "specific_pace" => Ok(Self::SpecificPace),
      "pre_race" => Ok(Self::PreRace),
      "race" => Ok(Self::Race),
      "rest" => Ok(Self::Rest),
      "long_run" => Ok(Self::LongRun),
      _ => Err(format!("Unknown session type: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  #[default]
  Planned,
  Completed,
  Missed,
}

impl std::fmt::Display for SessionStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Planned => write!(f, "planned"),
      Self::Completed => write!(f, "completed"),
      Self::Missed => write!(f, "missed"),
    }
  }
}

impl std::str::FromStr for SessionStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "planned" => Ok(Self::Planned),
      "completed" => Ok(Self::Completed),
      "missed" => Ok(Self::Missed),
      _ => Err(format!("Unknown session status: {}", s)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub date: NaiveDate,
  pub session_type: SessionType,
  pub description: String,
  pub target_intensity: String,
  pub planned_duration_min: u32,
  pub planned_distance_km: f64,
  pub status: SessionStatus,
  pub cancellation_reason: String,
}

impl Session {
  pub fn new(
    date: NaiveDate,
    session_type: SessionType,
    description: impl Into<String>,
    target_intensity: impl Into<String>,
    planned_duration_min: u32,
    planned_distance_km: f64,
  ) -> Self {
    Self {
      date,
      session_type,
      description: description.into(),
      target_intensity: target_intensity.into(),
      planned_duration_min,
      planned_distance_km,
      status: SessionStatus::Planned,
      cancellation_reason: String::new(),
    }
  }

  pub fn rest(date: NaiveDate) -> Self {
    Self::new(date, SessionType::Rest, "Rest", "", 0, 0.0)
  }

  pub fn with_date(mut self, date: NaiveDate) -> Self {
    self.date = date;
    self
  }

  pub fn is_rest(&self) -> bool {
    self.session_type == SessionType::Rest
  }

  pub fn mark_completed(&mut self) {
    self.status = SessionStatus::Completed;
    self.cancellation_reason.clear();
  }

  pub fn mark_missed(&mut self, reason: &str) {
    self.status = SessionStatus::Missed;
    self.cancellation_reason = clean_text(reason);
  }

  pub fn reset_status(&mut self) {
    self.status = SessionStatus::Planned;
    self.cancellation_reason.clear();
  }
}

/// Collapse line breaks so free text stays on one line
pub fn clean_text(s: &str) -> String {
  s.replace(['\r', '\n'], " ").trim().to_string()
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SwapError {
  #[error("Day index {0} out of range (0-6)")]
  OutOfRange(usize),

  #[error("Race and pre-race sessions cannot be moved")]
  FixedSession,

  #[error("Session on {0} is already completed or missed")]
  AlreadyRecorded(NaiveDate),
}

/// Seven consecutive days, one session per day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week {
  pub number: u32,
  pub sessions: Vec<Session>,
}

impl Week {
  pub fn new(number: u32, sessions: Vec<Session>) -> Self {
    Self { number, sessions }
  }

  /// Build a week from day slots; empty slots become rest days
  pub fn from_slots(number: u32, anchor: NaiveDate, slots: [Option<Session>; DAYS_PER_WEEK]) -> Self {
    let sessions = slots
      .into_iter()
      .enumerate()
      .map(|(day, slot)| slot.unwrap_or_else(|| Session::rest(anchor + Duration::days(day as i64))))
      .collect();
    Self { number, sessions }
  }

  pub fn day(&self, index: usize) -> Option<&Session> {
    self.sessions.get(index)
  }

  pub fn total_planned_km(&self) -> f64 {
    self.sessions.iter().map(|s| s.planned_distance_km).sum()
  }

  pub fn completed_km(&self) -> f64 {
    self
      .sessions
      .iter()
      .filter(|s| s.status == SessionStatus::Completed)
      .map(|s| s.planned_distance_km)
      .sum()
  }

  pub fn non_rest_count(&self) -> usize {
    self.sessions.iter().filter(|s| !s.is_rest()).count()
  }

  /// Swap two days of the week, each session taking the other's date
  pub fn swap_days(&mut self, a: usize, b: usize) -> Result<(), SwapError> {
    for idx in [a, b] {
      let session = self.sessions.get(idx).ok_or(SwapError::OutOfRange(idx))?;
      if matches!(session.session_type, SessionType::Race | SessionType::PreRace) {
        return Err(SwapError::FixedSession);
      }
      if session.status != SessionStatus::Planned {
        return Err(SwapError::AlreadyRecorded(session.date));
      }
    }
    if a == b {
      return Ok(());
    }

    let date_a = self.sessions[a].date;
    let date_b = self.sessions[b].date;
    self.sessions.swap(a, b);
    self.sessions[a].date = date_a;
    self.sessions[b].date = date_b;
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
  pub name: String,
  pub start_date: NaiveDate,
  pub objective: String,
  pub weeks: Vec<Week>,
}

impl Plan {
  pub fn duration_weeks(&self) -> usize {
    self.weeks.len()
  }

  pub fn race_week(&self) -> Option<&Week> {
    self.weeks.last()
  }

  pub fn sessions(&self) -> impl Iterator<Item = &Session> {
    self.weeks.iter().flat_map(|w| w.sessions.iter())
  }

  pub fn session_on(&self, date: NaiveDate) -> Option<&Session> {
    self.sessions().find(|s| s.date == date)
  }

  pub fn session_on_mut(&mut self, date: NaiveDate) -> Option<&mut Session> {
    self
      .weeks
      .iter_mut()
      .flat_map(|w| w.sessions.iter_mut())
      .find(|s| s.date == date)
  }
}

/// Completion summary over the non-rest sessions of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanProgress {
  pub total_expected: u32,
  pub total_completed: u32,
  pub total_missed: u32,
  pub completion_pct: f32,
  pub planned_km: f64,
  pub completed_km: f64,
}

impl PlanProgress {
  pub fn compute(plan: &Plan) -> Self {
    let mut total_expected = 0;
    let mut total_completed = 0;
    let mut total_missed = 0;
    for session in plan.sessions().filter(|s| !s.is_rest()) {
      total_expected += 1;
      match session.status {
        SessionStatus::Completed => total_completed += 1,
        SessionStatus::Missed => total_missed += 1,
        SessionStatus::Planned => {}
      }
    }

    let completion_pct = if total_expected > 0 {
      total_completed as f32 / total_expected as f32 * 100.0
    } else {
      0.0
    };

    Self {
      total_expected,
      total_completed,
      total_missed,
      completion_pct,
      planned_km: plan.weeks.iter().map(Week::total_planned_km).sum(),
      completed_km: plan.weeks.iter().map(Week::completed_km).sum(),
    }
  }
}
