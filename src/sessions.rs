//! Session library: fully described workouts for each intensity type
//!
//! Quality sessions rotate through five fixed structures keyed by
//! `week_index % 5` so consecutive weeks never repeat the same workout.
//! Every quality session is wrapped in a 10 min warm-up and a 10 min
//! cool-down at easy pace.

use chrono::NaiveDate;

use crate::models::{RunnerProfile, Session, SessionType};
use crate::physiology::{self, RACE_DISTANCE_KM};

/// Minimum distance of any easy run
pub const MIN_EASY_RUN_KM: f64 = 3.0;

/// Warm-up plus cool-down
pub const WARMUP_COOLDOWN_MIN: f64 = 20.0;

pub const ROTATION_LENGTH: usize = 5;

const EASY_SPEED_FRACTION: f64 = 0.65;
const THRESHOLD_SPEED_FRACTION: f64 = 0.85;
const SPECIFIC_SPEED_FRACTION: f64 = 0.90;
const VMA_SPEED_FRACTION: f64 = 1.00;

const PRE_RACE_DURATION_MIN: u32 = 20;

// ---------------------------------------------------------------------------
/// Interval Templates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effort {
    /// Repetitions over a fixed distance
    Distance { reps: u32, rep_km: f64 },
    /// Total time spent at target speed, whatever the split
    Timed { work_seconds: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalTemplate {
    pub structure: &'static str,
    pub effort: Effort,
    /// Total recovery between repetitions
    pub recovery_min: f64,
}

impl IntervalTemplate {
    /// Distance covered during the work portion at the given pace (s/km)
    pub fn work_km(&self, pace_sec: f64) -> f64 {
        match self.effort {
            Effort::Distance { reps, rep_km } => reps as f64 * rep_km,
            Effort::Timed { work_seconds } => work_seconds / pace_sec,
        }
    }

    /// Whole minutes including warm-up and cool-down
    pub fn duration_min(&self, pace_sec: f64) -> u32 {
        let work_min = match self.effort {
            Effort::Distance { reps, rep_km } => reps as f64 * (rep_km * pace_sec / 60.0),
            Effort::Timed { work_seconds } => work_seconds / 60.0,
        };
        (work_min + self.recovery_min + WARMUP_COOLDOWN_MIN) as u32
    }
}

const fn distance(structure: &'static str, reps: u32, rep_km: f64, recovery_min: f64) -> IntervalTemplate {
    IntervalTemplate {
        structure,
        effort: Effort::Distance { reps, rep_km },
        recovery_min,
    }
}

const fn timed(structure: &'static str, work_seconds: f64, recovery_min: f64) -> IntervalTemplate {
    IntervalTemplate {
        structure,
        effort: Effort::Timed { work_seconds },
        recovery_min,
    }
}

pub const VMA_ROTATION: [IntervalTemplate; ROTATION_LENGTH] = [
    distance("10x400m (r: 1'15)", 10, 0.4, 9.0 * 1.25),
    distance("8x500m (r: 1'30)", 8, 0.5, 7.0 * 1.5),
    timed("20x (30s/30s)", 20.0 * 30.0, 10.0),
    distance("12x300m (r: 1')", 12, 0.3, 11.0),
    timed("15x (45s/45s)", 15.0 * 45.0, 11.25),
];

pub const THRESHOLD_ROTATION: [IntervalTemplate; ROTATION_LENGTH] = [
    timed("3x8 min (r: 2')", 24.0 * 60.0, 4.0),
    timed("2x12 min (r: 3')", 24.0 * 60.0, 3.0),
    timed("6x4 min (r: 1')", 24.0 * 60.0, 5.0),
    timed("15min+5min (r: 1')", 20.0 * 60.0, 1.0),
    timed("10+8+6 min (r: 2')", 24.0 * 60.0, 4.0),
];

pub const SPECIFIC_PACE_ROTATION: [IntervalTemplate; ROTATION_LENGTH] = [
    distance("3x2000m (r: 2'30)", 3, 2.0, 5.0),
    distance("2x3000m (r: 3')", 2, 3.0, 3.0),
    distance("6000m continuous", 1, 6.0, 0.0),
    distance("4x2000m (r: 2'30)", 4, 2.0, 7.5),
    distance("6x1000m (r: 1')", 6, 1.0, 5.0),
];

pub fn rotation_index(week_index: usize) -> usize {
    week_index % ROTATION_LENGTH
}

// ---------------------------------------------------------------------------
/// Easy Pace Helpers
// ---------------------------------------------------------------------------

/// Seconds per km at 65% VMA
pub fn easy_pace_seconds(profile: &RunnerProfile) -> f64 {
    physiology::speed_to_pace_seconds(profile.vma.kmh() * EASY_SPEED_FRACTION)
}

/// Distance covered during warm-up and cool-down at easy pace
pub fn warmup_cooldown_km(profile: &RunnerProfile) -> f64 {
    WARMUP_COOLDOWN_MIN * 60.0 / easy_pace_seconds(profile)
}

// ---------------------------------------------------------------------------
/// Session Factories
// ---------------------------------------------------------------------------

pub fn build_easy_run(date: NaiveDate, profile: &RunnerProfile, distance_km: f64) -> Session {
    let distance_km = distance_km.max(MIN_EASY_RUN_KM);
    let duration = (distance_km * easy_pace_seconds(profile) / 60.0) as u32;

    let description = format!(
        "{} min easy run ({:.1} km) - {}",
        duration,
        distance_km,
        physiology::heart_rate_zone_label(profile, 0.65, 0.75)
    );

    Session::new(
        date,
        SessionType::EasyRun,
        description,
        physiology::easy_pace_range(profile.vma.kmh()),
        duration,
        distance_km,
    )
}

pub fn build_vma(date: NaiveDate, profile: &RunnerProfile, week_index: usize) -> Session {
    build_interval_session(
        date,
        profile,
        SessionType::Vma,
        &VMA_ROTATION[rotation_index(week_index)],
        VMA_SPEED_FRACTION,
        physiology::vma_pace_range(profile.vma.kmh()),
    )
}

pub fn build_threshold(date: NaiveDate, profile: &RunnerProfile, week_index: usize) -> Session {
    build_interval_session(
        date,
        profile,
        SessionType::Threshold,
        &THRESHOLD_ROTATION[rotation_index(week_index)],
        THRESHOLD_SPEED_FRACTION,
        physiology::threshold_pace_range(profile.vma.kmh()),
    )
}

pub fn build_specific_pace(date: NaiveDate, profile: &RunnerProfile, week_index: usize) -> Session {
    build_interval_session(
        date,
        profile,
        SessionType::SpecificPace,
        &SPECIFIC_PACE_ROTATION[rotation_index(week_index)],
        SPECIFIC_SPEED_FRACTION,
        physiology::specific_pace_range(profile.vma.kmh()),
    )
}

/// Build whichever quality session `session_type` names
pub fn build_quality(
    session_type: SessionType,
    date: NaiveDate,
    profile: &RunnerProfile,
    week_index: usize,
) -> Option<Session> {
    match session_type {
        SessionType::Vma => Some(build_vma(date, profile, week_index)),
        SessionType::Threshold => Some(build_threshold(date, profile, week_index)),
        SessionType::SpecificPace => Some(build_specific_pace(date, profile, week_index)),
        _ => None,
    }
}

fn build_interval_session(
    date: NaiveDate,
    profile: &RunnerProfile,
    session_type: SessionType,
    template: &IntervalTemplate,
    speed_fraction: f64,
    target_intensity: String,
) -> Session {
    let pace_sec = physiology::speed_to_pace_seconds(profile.vma.kmh() * speed_fraction);

    let description = format!(
        "10 min warm-up at easy pace + {} + 10 min cool-down at easy pace",
        template.structure
    );

    Session::new(
        date,
        session_type,
        description,
        target_intensity,
        template.duration_min(pace_sec),
        warmup_cooldown_km(profile) + template.work_km(pace_sec),
    )
}

/// Light activation the day before the race
pub fn build_pre_race_activation(date: NaiveDate, profile: &RunnerProfile) -> Session {
    let distance_km = PRE_RACE_DURATION_MIN as f64 * 60.0 / easy_pace_seconds(profile);
    Session::new(
        date,
        SessionType::PreRace,
        "15 min easy run + strides",
        physiology::easy_pace_range(profile.vma.kmh()),
        PRE_RACE_DURATION_MIN,
        distance_km,
    )
}

/// Race session; the target pace is derived from the objective over 10 km
pub fn build_race_day(date: NaiveDate, _profile: &RunnerProfile, target_time: &str) -> Session {
    let target_min = physiology::parse_target_time_minutes(target_time);
    let pace_sec = target_min * 60.0 / RACE_DISTANCE_KM;

    Session::new(
        date,
        SessionType::Race,
        "Race day: 10 km!",
        format!("Target: {} min/km", physiology::format_pace(pace_sec)),
        target_min as u32,
        RACE_DISTANCE_KM,
    )
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use crate::test_utils::mock_profile;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 3).unwrap()
    }

    #[test]
    fn test_easy_run_duration_and_floor() {
        let profile = mock_profile(12.0, 30.0);

        // Easy pace at VMA 12 = 3600 / 7.8 = 461.5 s/km
        let run = build_easy_run(day(), &profile, 5.0);
        assert_eq!(run.session_type, SessionType::EasyRun);
        assert_eq!(run.planned_duration_min, 38);
        assert_approx_eq!(run.planned_distance_km, 5.0, 1e-9);
        assert!(run.description.starts_with("38 min easy run (5.0 km) - 65-75% of max HR"));
        assert_eq!(run.target_intensity, "7:08 - 8:20 min/km");

        let short = build_easy_run(day(), &profile, 1.2);
        assert_approx_eq!(short.planned_distance_km, MIN_EASY_RUN_KM, 1e-9);
        assert_eq!(short.planned_duration_min, 23);
    }

    #[test]
    fn test_vma_rotation_week_zero() {
        let profile = mock_profile(12.0, 30.0);
        let session = build_vma(day(), &profile, 0);

        assert_eq!(session.session_type, SessionType::Vma);
        assert!(session.description.contains("10x400m (r: 1'15)"));
        // 10 x 2 min at 5:00/km + 11.25 min recovery + 20
        assert_eq!(session.planned_duration_min, 51);
        // 2.6 km warm-up/cool-down + 4 km of intervals
        assert_approx_eq!(session.planned_distance_km, 6.6, 1e-6);
    }

    #[test]
    fn test_vma_timed_variants() {
        let profile = mock_profile(12.0, 30.0);

        let thirty_thirty = build_vma(day(), &profile, 2);
        assert!(thirty_thirty.description.contains("20x (30s/30s)"));
        assert_eq!(thirty_thirty.planned_duration_min, 40);
        assert_approx_eq!(thirty_thirty.planned_distance_km, 4.6, 1e-6);

        let forty_five = build_vma(day(), &profile, 4);
        assert_eq!(forty_five.planned_duration_min, 42);
    }

    #[test]
    fn test_rotation_wraps_every_five_weeks() {
        let profile = mock_profile(14.0, 40.0);
        for week in 0..5 {
            assert_eq!(
                build_threshold(day(), &profile, week).description,
                build_threshold(day(), &profile, week + 5).description
            );
        }
        assert_ne!(
            build_specific_pace(day(), &profile, 0).description,
            build_specific_pace(day(), &profile, 1).description
        );
    }

    #[test]
    fn test_threshold_durations_follow_table() {
        let profile = mock_profile(12.0, 30.0);
        let expected = [48, 47, 49, 41, 48];
        for (week, minutes) in expected.iter().enumerate() {
            assert_eq!(build_threshold(day(), &profile, week).planned_duration_min, *minutes);
        }

        // 24 min at 85% VMA (10.2 km/h) = 4.08 km
        let session = build_threshold(day(), &profile, 0);
        assert_approx_eq!(session.planned_distance_km, 2.6 + 4.08, 1e-6);
        assert_eq!(session.target_intensity, physiology::threshold_pace_range(12.0));
    }

    #[test]
    fn test_specific_pace_week_zero() {
        let profile = mock_profile(12.0, 30.0);
        let session = build_specific_pace(day(), &profile, 0);
        // 3 x 2 km at 333.3 s/km = 33.3 min + 5 + 20
        assert_eq!(session.planned_duration_min, 58);
        assert_approx_eq!(session.planned_distance_km, 8.6, 1e-6);

        let long = build_specific_pace(day(), &profile, 3);
        assert_approx_eq!(long.planned_distance_km, 10.6, 1e-6);
    }

    #[test]
    fn test_pre_race_and_race_day() {
        let profile = mock_profile(12.0, 30.0);

        let pre = build_pre_race_activation(day(), &profile);
        assert_eq!(pre.session_type, SessionType::PreRace);
        assert_eq!(pre.planned_duration_min, 20);
        assert_approx_eq!(pre.planned_distance_km, 2.6, 1e-6);

        let race = build_race_day(day(), &profile, "52:30");
        assert_eq!(race.session_type, SessionType::Race);
        assert_eq!(race.target_intensity, "Target: 5:15 min/km");
        assert_eq!(race.planned_duration_min, 52);
        assert_approx_eq!(race.planned_distance_km, 10.0, 1e-9);

        let finish = build_race_day(day(), &profile, "1:02:30 (Obj. Finir)");
        assert_eq!(finish.planned_duration_min, 62);
        assert_eq!(finish.target_intensity, "Target: 6:15 min/km");
    }

    #[test]
    fn test_build_quality_dispatch() {
        let profile = mock_profile(12.0, 30.0);
        assert!(build_quality(SessionType::EasyRun, day(), &profile, 0).is_none());
        let vma = build_quality(SessionType::Vma, day(), &profile, 1).unwrap();
        assert!(vma.description.contains("8x500m"));
    }
}
