use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::physiology;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
  Male,
  Female,
}

impl std::fmt::Display for Sex {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Male => write!(f, "male"),
      Self::Female => write!(f, "female"),
    }
  }
}

impl std::str::FromStr for Sex {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "male" | "m" => Ok(Self::Male),
      "female" | "f" => Ok(Self::Female),
      _ => Err(format!("Unknown sex: {}", s)),
    }
  }
}

/// Maximal aerobic speed in km/h, guaranteed within [8, 20]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Vma(f64);

impl Vma {
  pub const MIN_KMH: f64 = 8.0;
  pub const MAX_KMH: f64 = 20.0;

  pub fn new(kmh: f64) -> ValidationResult<Self> {
    if !(Self::MIN_KMH..=Self::MAX_KMH).contains(&kmh) {
      return Err(ValidationError::InvalidPace(format!(
        "VMA {} km/h out of range. Must be between 8 and 20 km/h.",
        kmh
      )));
    }
    Ok(Self(kmh))
  }

  pub fn kmh(self) -> f64 {
    self.0
  }
}

impl TryFrom<f64> for Vma {
  type Error = ValidationError;
  fn try_from(kmh: f64) -> Result<Self, Self::Error> {
    Self::new(kmh)
  }
}

impl From<Vma> for f64 {
  fn from(vma: Vma) -> Self {
    vma.0
  }
}

/// Physiological profile of the runner the plan is built for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerProfile {
  pub first_name: String,
  pub last_name: String,
  pub city: Option<String>,
  pub age: u32,
  pub sex: Sex,
  pub height_cm: f64,
  pub weight_kg: f64,
  pub vma: Vma,
  pub max_hr: i32,
  pub rest_hr: i32,
  pub weekly_volume_km: f64,
}

impl RunnerProfile {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  /// Reject anthropometry and heart rate values outside their plausible ranges
  pub fn validate(&self) -> ValidationResult<()> {
    physiology::compute_bmi(self.weight_kg, self.height_cm)?;
    physiology::validate_heart_rate_data(self.rest_hr, self.max_hr)?;
    Ok(())
  }

  pub fn bmi(&self) -> ValidationResult<f64> {
    physiology::compute_bmi(self.weight_kg, self.height_cm)
  }
}
