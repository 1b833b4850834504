use chrono::{Datelike, Duration, NaiveDate, Weekday};
use coach10k::generator::{session_count_for_volume, Mode, VolumePolicy};
use coach10k::{
  generate, PlanParameters, PlanProgress, RunnerProfile, SessionStatus, SessionType, Sex,
  ValidationError, Vma,
};

fn runner(vma: f64, volume: f64) -> RunnerProfile {
  RunnerProfile {
    first_name: "Alex".to_string(),
    last_name: "Martin".to_string(),
    city: None,
    age: 41,
    sex: Sex::Male,
    height_cm: 180.0,
    weight_kg: 74.0,
    vma: Vma::new(vma).unwrap(),
    max_hr: 185,
    rest_hr: 55,
    weekly_volume_km: volume,
  }
}

fn params(weeks: u32, target: Option<&str>) -> PlanParameters {
  let start = NaiveDate::from_ymd_opt(2027, 3, 1).unwrap();
  PlanParameters::new(weeks, start, target.map(str::to_string))
}

#[test]
fn every_duration_ends_with_race_on_last_day() {
  for weeks in 6..=10 {
    let plan = generate(&runner(13.0, 35.0), &params(weeks, None)).unwrap();
    assert_eq!(plan.duration_weeks(), weeks as usize);

    let race_week = plan.race_week().unwrap();
    let race = &race_week.sessions[6];
    assert_eq!(race.session_type, SessionType::Race);
    assert_eq!(race.planned_distance_km, 10.0);
    assert_eq!(race.date, plan.start_date + Duration::days(weeks as i64 * 7 - 1));
    assert_eq!(race_week.sessions[5].session_type, SessionType::PreRace);

    assert_eq!(plan.sessions().filter(|s| s.session_type == SessionType::Race).count(), 1);
  }
}

#[test]
fn performance_plan_mixes_all_quality_types() {
  let plan = generate(&runner(15.0, 40.0), &params(10, Some("44:00"))).unwrap();
  assert_eq!(plan.objective, "44:00");

  for wanted in [SessionType::Vma, SessionType::Threshold, SessionType::SpecificPace] {
    assert!(plan.sessions().any(|s| s.session_type == wanted), "{:?} missing", wanted);
  }
  assert!(plan.sessions().all(|s| s.status == SessionStatus::Planned));
  assert!(plan
    .sessions()
    .filter(|s| s.session_type == SessionType::EasyRun)
    .all(|s| s.planned_distance_km >= 3.0));
}

#[test]
fn weekly_structure_is_stable() {
  let profile = runner(14.0, 42.0);
  let plan = generate(&profile, &params(8, Some("47:30"))).unwrap();
  let policy = VolumePolicy::new(42.0, Mode::Performance);
  assert_eq!(policy.session_count, session_count_for_volume(42.0));

  for week in &plan.weeks {
    assert_eq!(week.sessions.len(), 7);
    assert_eq!(week.sessions[0].date.weekday(), Weekday::Mon);
    assert_eq!(week.non_rest_count(), policy.session_count);
    assert!(week.total_planned_km() <= policy.ceiling_km + 1e-6);
  }
}

#[test]
fn validation_failures_stop_generation() {
  let profile = runner(12.0, 30.0);

  assert!(matches!(
    generate(&profile, &params(8, Some("38:00"))),
    Err(ValidationError::UnrealisticObjective(_))
  ));
  assert!(matches!(
    generate(&profile, &params(8, Some("1:10:00"))),
    Err(ValidationError::MissingObjectiveMode(_))
  ));

  let mut low_hr = profile.clone();
  low_hr.max_hr = 95;
  assert!(matches!(
    generate(&low_hr, &params(8, None)),
    Err(ValidationError::InvalidHeartRateData(_))
  ));

  assert!(Vma::new(22.0).is_err());
}

#[test]
fn progress_tracks_marked_sessions() {
  let mut plan = generate(&runner(12.0, 30.0), &params(6, None)).unwrap();
  let first = plan.start_date;

  plan.session_on_mut(first).unwrap().mark_completed();
  plan
    .session_on_mut(first + Duration::days(2))
    .unwrap()
    .mark_missed("work trip");

  let progress = PlanProgress::compute(&plan);
  assert_eq!(progress.total_expected, 24);
  assert_eq!(progress.total_completed, 1);
  assert_eq!(progress.total_missed, 1);
  assert!(progress.completed_km > 0.0);
  assert!(progress.planned_km > progress.completed_km);
}

#[test]
fn plan_serializes_to_json() {
  let plan = generate(&runner(12.0, 30.0), &params(6, None)).unwrap();
  let json = serde_json::to_value(&plan).unwrap();

  assert_eq!(json["weeks"].as_array().unwrap().len(), 6);
  assert_eq!(json["weeks"][5]["sessions"][6]["session_type"], "race");
  assert_eq!(json["weeks"][0]["sessions"][0]["status"], "planned");
}
