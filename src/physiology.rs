//! Physiological calculations feeding the plan generator
//!
//! Pure functions: anthropometry and heart rate plausibility checks, pace and
//! speed conversions, target time parsing and the pace bands derived from VMA.
//! Nothing here holds state.

use crate::error::{ValidationError, ValidationResult};
use crate::models::RunnerProfile;

/// Race distance every objective is expressed over
pub const RACE_DISTANCE_KM: f64 = 10.0;

/// Appended to the computed objective when no target time was given
pub const FINISH_SUFFIX: &str = " (Obj. Finir)";

/// Label returned by [`heart_rate_zone_label`] when max HR is unusable
pub const INVALID_HR_LABEL: &str = "Invalid HR";

/// ---------------------------------------------------------------------------
/// Validation
/// ---------------------------------------------------------------------------

/// BMI from weight (kg) and height (cm), rejecting implausible inputs
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> ValidationResult<f64> {
  if weight_kg <= 0.0 || height_cm <= 0.0 {
    return Err(ValidationError::InvalidAnthropometry(
      "Weight and height must be positive.".to_string(),
    ));
  }
  if !(120.0..=240.0).contains(&height_cm) {
    return Err(ValidationError::InvalidAnthropometry(format!(
      "Height out of range ({} cm). Must be between 120 and 240 cm.",
      height_cm as i32
    )));
  }
  if !(40.0..=150.0).contains(&weight_kg) {
    return Err(ValidationError::InvalidAnthropometry(format!(
      "Weight out of range ({} kg). Must be between 40 and 150 kg.",
      weight_kg
    )));
  }

  let height_m = height_cm / 100.0;
  let bmi = weight_kg / (height_m * height_m);

  if !(12.0..=38.0).contains(&bmi) {
    return Err(ValidationError::InvalidAnthropometry(format!(
      "Computed BMI ({:.1}) outside 12-38. Check height and weight.",
      bmi
    )));
  }
  Ok(bmi)
}

pub fn validate_heart_rate_data(rest_hr: i32, max_hr: i32) -> ValidationResult<()> {
  if rest_hr <= 20 {
    return Err(ValidationError::InvalidHeartRateData(format!(
      "Resting HR too low ({}). Must be above 20 bpm.",
      rest_hr
    )));
  }
  if max_hr > 225 {
    return Err(ValidationError::InvalidHeartRateData(format!(
      "Max HR too high ({}). Must be 225 bpm or less.",
      max_hr
    )));
  }
  if max_hr < 100 {
    return Err(ValidationError::InvalidHeartRateData(format!(
      "Max HR too low ({}). Minimum is 100 bpm.",
      max_hr
    )));
  }
  if max_hr < rest_hr + 60 {
    return Err(ValidationError::InvalidHeartRateData(format!(
      "Gap between resting HR ({}) and max HR ({}) too small. Need at least 60 bpm.",
      rest_hr, max_hr
    )));
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Heart Rate and Aerobic Capacity
/// ---------------------------------------------------------------------------

/// "65-75% of max HR : 123-142 bpm"
pub fn heart_rate_zone_label(profile: &RunnerProfile, pct_min: f64, pct_max: f64) -> String {
  if profile.max_hr <= 0 {
    return INVALID_HR_LABEL.to_string();
  }

  let bpm_min = (profile.max_hr as f64 * pct_min) as i32;
  let bpm_max = (profile.max_hr as f64 * pct_max) as i32;

  format!(
    "{}-{}% of max HR : {}-{} bpm",
    (pct_min * 100.0) as i32,
    (pct_max * 100.0) as i32,
    bpm_min,
    bpm_max
  )
}

/// Fraction of VMA a target speed represents
pub fn percent_of_vma(target_speed_kmh: f64, vma: f64) -> ValidationResult<f64> {
  if !(8.0..=20.0).contains(&vma) {
    return Err(ValidationError::InvalidPace(format!(
      "VMA {} km/h out of range. Must be between 8 and 20 km/h.",
      vma
    )));
  }
  Ok(target_speed_kmh / vma)
}

/// ml/kg/min
pub fn estimate_vo2max(vma: f64) -> f64 {
  vma * 3.5
}

/// ---------------------------------------------------------------------------
/// Pace / Speed Conversions
/// ---------------------------------------------------------------------------

/// km/h -> seconds per km (0 for non-positive speed)
pub fn speed_to_pace_seconds(speed_kmh: f64) -> f64 {
  if speed_kmh <= 0.0 {
    0.0
  } else {
    3600.0 / speed_kmh
  }
}

/// seconds per km -> km/h (0 for non-positive pace)
pub fn pace_seconds_to_speed(pace_sec: f64) -> f64 {
  if pace_sec <= 0.0 {
    0.0
  } else {
    3600.0 / pace_sec
  }
}

/// Minutes from "mm:ss" or "hh:mm:ss"; anything unparseable yields 0
pub fn parse_target_time_minutes(text: &str) -> f64 {
  let text = text.trim();
  let text = text.strip_suffix(FINISH_SUFFIX.trim_start()).unwrap_or(text).trim();

  let parts: Option<Vec<f64>> = text.split(':').map(parse_time_part).collect();
  match parts.as_deref() {
    Some([m, s]) => m + s / 60.0,
    Some([h, m, s]) => h * 60.0 + m + s / 60.0,
    _ => 0.0,
  }
}

/// Digits with an optional decimal point; signs, `nan` and `inf` are refused
fn parse_time_part(part: &str) -> Option<f64> {
  let part = part.trim();
  if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit() || c == '.') {
    return None;
  }
  part.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Average speed (km/h) covering `distance_km` in `minutes`
pub fn target_speed_from_time(distance_km: f64, minutes: f64) -> f64 {
  if minutes <= 0.0 {
    0.0
  } else {
    distance_km / (minutes / 60.0)
  }
}

/// "m:ss" from seconds, truncated to the whole second
pub fn format_pace(seconds: f64) -> String {
  let secs = seconds as i64;
  format!("{}:{:02}", secs / 60, secs % 60)
}

/// ---------------------------------------------------------------------------
/// Pace Bands
/// ---------------------------------------------------------------------------

/// "m:ss - m:ss min/km" from the faster bound (pct_max) to the slower (pct_min)
pub fn pace_range_label(vma: f64, pct_min: f64, pct_max: f64) -> String {
  let fast = speed_to_pace_seconds(vma * pct_max);
  let mut slow = speed_to_pace_seconds(vma * pct_min);
  if slow - fast < 5.0 {
    slow = fast + 5.0;
  }
  format!("{} - {} min/km", format_pace(fast), format_pace(slow))
}

pub fn easy_pace_range(vma: f64) -> String {
  pace_range_label(vma, 0.60, 0.70)
}

pub fn threshold_pace_range(vma: f64) -> String {
  pace_range_label(vma, 0.83, 0.88)
}

pub fn specific_pace_range(vma: f64) -> String {
  pace_range_label(vma, 0.88, 0.92)
}

pub fn vma_pace_range(vma: f64) -> String {
  pace_range_label(vma, 1.00, 1.05)
}

/// Walking recovery between intervals, fixed reference of 10 km/h
pub fn recovery_walk_pace_range() -> String {
  pace_range_label(10.0, 0.4, 0.6)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::test_utils::mock_profile;

  #[test]
  fn test_bmi_nominal() {
    let bmi = compute_bmi(70.0, 175.0).unwrap();
    assert_approx_eq!(bmi, 22.857, 0.01);
  }

  #[test]
  fn test_bmi_rejections() {
    assert!(matches!(
      compute_bmi(200.0, 175.0),
      Err(ValidationError::InvalidAnthropometry(_))
    ));
    assert!(matches!(
      compute_bmi(0.0, 175.0),
      Err(ValidationError::InvalidAnthropometry(_))
    ));
    assert!(matches!(
      compute_bmi(70.0, 250.0),
      Err(ValidationError::InvalidAnthropometry(_))
    ));

    // Each input in range but the ratio is not: 150 kg at 1.80 m = 46.3
    let err = compute_bmi(150.0, 180.0).unwrap_err();
    assert!(err.to_string().contains("46.3"), "{}", err);
  }

  #[test]
  fn test_heart_rate_rules() {
    assert!(validate_heart_rate_data(50, 190).is_ok());
    assert!(validate_heart_rate_data(20, 190).is_err());
    assert!(validate_heart_rate_data(50, 226).is_err());
    assert!(validate_heart_rate_data(30, 99).is_err());

    // 60 bpm gap is the minimum
    assert!(validate_heart_rate_data(60, 120).is_ok());
    let err = validate_heart_rate_data(61, 120).unwrap_err();
    assert!(err.to_string().contains("61") && err.to_string().contains("120"));
  }

  #[test]
  fn test_heart_rate_zone_label() {
    let mut profile = mock_profile(12.0, 30.0);
    profile.max_hr = 190;
    assert_eq!(
      heart_rate_zone_label(&profile, 0.65, 0.75),
      "65-75% of max HR : 123-142 bpm"
    );

    profile.max_hr = 0;
    assert_eq!(heart_rate_zone_label(&profile, 0.65, 0.75), INVALID_HR_LABEL);
  }

  #[test]
  fn test_percent_of_vma() {
    assert_approx_eq!(percent_of_vma(12.0, 15.0).unwrap(), 0.8, 1e-9);
    assert!(matches!(
      percent_of_vma(12.0, 7.0),
      Err(ValidationError::InvalidPace(_))
    ));
  }

  #[test]
  fn test_conversions() {
    assert_approx_eq!(speed_to_pace_seconds(12.0), 300.0, 1e-9);
    assert_eq!(speed_to_pace_seconds(0.0), 0.0);
    assert_approx_eq!(pace_seconds_to_speed(300.0), 12.0, 1e-9);
    assert_eq!(pace_seconds_to_speed(-1.0), 0.0);
    assert_approx_eq!(estimate_vo2max(14.0), 49.0, 1e-9);
    assert_approx_eq!(target_speed_from_time(10.0, 50.0), 12.0, 1e-9);
    assert_eq!(target_speed_from_time(10.0, 0.0), 0.0);
  }

  #[test]
  fn test_parse_target_time() {
    assert_approx_eq!(parse_target_time_minutes("45:30"), 45.5, 1e-9);
    assert_approx_eq!(parse_target_time_minutes("1:05:30"), 65.5, 1e-9);
    assert_approx_eq!(parse_target_time_minutes("1:02:30 (Obj. Finir)"), 62.5, 1e-9);
    assert_eq!(parse_target_time_minutes("fast"), 0.0);
    assert_eq!(parse_target_time_minutes("45"), 0.0);
    assert_eq!(parse_target_time_minutes("1:2:3:4"), 0.0);
    assert_eq!(parse_target_time_minutes(""), 0.0);
    assert_eq!(parse_target_time_minutes("nan:00"), 0.0);
    assert_eq!(parse_target_time_minutes("45:NaN"), 0.0);
    assert_eq!(parse_target_time_minutes("inf:00"), 0.0);
    assert_eq!(parse_target_time_minutes("Infinity:00"), 0.0);
    assert_eq!(parse_target_time_minutes("-1:90"), 0.0);
  }

  #[test]
  fn test_pace_range_labels() {
    assert_eq!(easy_pace_range(12.0), "7:08 - 8:20 min/km");
    assert_eq!(vma_pace_range(12.0), "4:45 - 5:00 min/km");
    assert_eq!(recovery_walk_pace_range(), "10:00 - 15:00 min/km");
  }

  #[test]
  fn test_pace_range_minimum_spread() {
    // 178.2 s vs 180 s would be a 1 s wide band
    assert_eq!(pace_range_label(20.0, 1.00, 1.01), "2:58 - 3:03 min/km");
  }

  #[test]
  fn test_format_pace() {
    assert_eq!(format_pace(300.0), "5:00");
    assert_eq!(format_pace(428.57), "7:08");
    assert_eq!(format_pace(59.9), "0:59");
  }
}
