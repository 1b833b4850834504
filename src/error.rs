//! Validation failures raised before a plan is built
//!
//! Every variant carries the offending value(s) in its message so the caller
//! can show it to the runner as-is.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
  #[error("Invalid anthropometry: {0}")]
  InvalidAnthropometry(String),

  #[error("Invalid heart rate data: {0}")]
  InvalidHeartRateData(String),

  #[error("Invalid pace: {0}")]
  InvalidPace(String),

  #[error("Unrealistic objective: {0}")]
  UnrealisticObjective(String),

  #[error("Missing objective mode: {0}")]
  MissingObjectiveMode(String),

  #[error("Invalid plan duration ({0} weeks). Must be between 6 and 10 weeks.")]
  InvalidPlanDuration(u32),

  #[error("Invalid start date {0}: the plan would end past the last representable date.")]
  InvalidStartDate(NaiveDate),
}

impl Serialize for ValidationError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
