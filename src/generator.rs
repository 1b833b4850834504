//! Plan Generator
//!
//! Turns a runner profile and plan parameters into a full week-by-week plan.
//!
//! - objective: Finish mode (80% VMA) or Performance mode (target time)
//! - volume: weekly floor per mode, +10%/week up to a ceiling of 4 compounding steps
//! - phases: Start (weeks 1-2), Build, Taper (second to last), Race (last)
//! - day patterns and weekday slots are fixed tables keyed by session count
//!
//! Generation is pure and deterministic. All validation runs before the first
//! week is built; on failure no plan is returned.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ValidationError, ValidationResult};
use crate::models::{Plan, PlanParameters, RunnerProfile, Session, SessionType, Week, DAYS_PER_WEEK};
use crate::physiology::{self, FINISH_SUFFIX, RACE_DISTANCE_KM};
use crate::sessions;

pub const MIN_DURATION_WEEKS: u32 = 6;
pub const MAX_DURATION_WEEKS: u32 = 10;

pub const FINISH_VOLUME_FLOOR_KM: f64 = 15.0;
pub const PERFORMANCE_VOLUME_FLOOR_KM: f64 = 25.0;

pub const WEEKLY_PROGRESSION: f64 = 1.10;
pub const PROGRESSION_STEPS: i32 = 4;

/// Finish mode runs the race at this fraction of VMA
pub const FINISH_VMA_FRACTION: f64 = 0.80;
/// Target times faster than this fraction of VMA are refused
pub const MAX_TARGET_VMA_FRACTION: f64 = 0.93;

/// Weeks at the start of the plan labelled Start
const START_PHASE_WEEKS: usize = 2;

/// Rotation index of the Threshold reminder in a Finish-mode race week
const RACE_WEEK_THRESHOLD_ROTATION: usize = 1;

// ---------------------------------------------------------------------------
/// Mode and Phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No target time; aim to finish at 80% VMA
    Finish,
    /// Explicit target time
    Performance,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Finish => write!(f, "finish"),
            Mode::Performance => write!(f, "performance"),
        }
    }
}

impl Mode {
    pub fn volume_floor_km(&self) -> f64 {
        match self {
            Mode::Finish => FINISH_VOLUME_FLOOR_KM,
            Mode::Performance => PERFORMANCE_VOLUME_FLOOR_KM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Start,
    Build,
    Taper,
    Race,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Start => write!(f, "start"),
            Phase::Build => write!(f, "build"),
            Phase::Taper => write!(f, "taper"),
            Phase::Race => write!(f, "race"),
        }
    }
}

impl Phase {
    /// Phase of week `index` (0-based) in a plan of `duration` weeks
    pub fn for_week(index: usize, duration: usize) -> Self {
        if index + 1 == duration {
            Phase::Race
        } else if index + 2 == duration {
            Phase::Taper
        } else if index < START_PHASE_WEEKS {
            Phase::Start
        } else {
            Phase::Build
        }
    }

    /// Weeks whose target volume drops back to the base volume
    fn resets_volume(index: usize, duration: usize) -> bool {
        index == 0 || index + 2 == duration
    }

    fn pattern_index(&self) -> Option<usize> {
        match self {
            Phase::Start => Some(0),
            Phase::Build => Some(1),
            Phase::Taper => Some(2),
            Phase::Race => None,
        }
    }
}

// ---------------------------------------------------------------------------
/// Day Pattern Tables
// ---------------------------------------------------------------------------

const E: SessionType = SessionType::EasyRun;
const T: SessionType = SessionType::Threshold;
const V: SessionType = SessionType::Vma;
const S: SessionType = SessionType::SpecificPace;

/// Indexed by [session_count - 3][Start, Build, Taper]
const PERFORMANCE_PATTERNS: [[&[SessionType]; 3]; 4] = [
    [&[E, T, V], &[E, S, V], &[E, S, T]],
    [&[E, T, E, V], &[E, S, E, V], &[E, S, E, T]],
    [&[E, T, E, V, E], &[E, S, E, V, E], &[E, S, E, T, E]],
    [&[E, T, E, V, E, T], &[E, S, E, V, E, T], &[E, S, E, T, E, E]],
];

const FINISH_PATTERNS: [[&[SessionType]; 3]; 4] = [
    [&[E, T, E], &[E, S, E], &[E, T, E]],
    [&[E, E, T, E], &[E, E, S, E], &[E, E, T, E]],
    [&[E, T, E, T, E], &[E, S, E, T, E], &[E, E, E, S, E]],
    [&[E, E, T, E, E, T], &[E, E, S, E, E, T], &[E, E, T, E, E, S]],
];

/// Weekday slots (0 = first day of the week) by session count
const DAY_SLOTS: [&[usize]; 4] = [
    &[1, 3, 5],
    &[0, 2, 4, 6],
    &[0, 1, 3, 4, 6],
    &[0, 1, 2, 4, 5, 6],
];

/// Easy run slots in a Performance-mode race week, filled in this order
const PERFORMANCE_RACE_EASY_SLOTS: [usize; 4] = [1, 4, 2, 0];

const MIN_SESSIONS: usize = 3;
const MAX_SESSIONS: usize = 6;

pub fn day_slots(session_count: usize) -> &'static [usize] {
    let count = session_count.clamp(MIN_SESSIONS, MAX_SESSIONS);
    DAY_SLOTS[count - MIN_SESSIONS]
}

/// Session types for a non-race week; `None` for the race week
pub fn day_pattern(
    mode: Mode,
    session_count: usize,
    phase: Phase,
) -> Option<&'static [SessionType]> {
    let count = session_count.clamp(MIN_SESSIONS, MAX_SESSIONS);
    let table = match mode {
        Mode::Finish => &FINISH_PATTERNS,
        Mode::Performance => &PERFORMANCE_PATTERNS,
    };
    phase.pattern_index().map(|p| table[count - MIN_SESSIONS][p])
}

// ---------------------------------------------------------------------------
/// Objective and Volume Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub mode: Mode,
    /// Shown on the plan and parsed again for the race session
    pub label: String,
    pub target_minutes: f64,
}

/// Resolve the race objective from the profile VMA and the optional target time
pub fn resolve_objective(
    profile: &RunnerProfile,
    params: &PlanParameters,
) -> ValidationResult<Objective> {
    let vma = profile.vma.kmh();

    let Some(target) = params.target() else {
        let speed = vma * FINISH_VMA_FRACTION;
        let hours = RACE_DISTANCE_KM / speed;
        return Ok(Objective {
            mode: Mode::Finish,
            label: format!("{}{}", format_hms(hours), FINISH_SUFFIX),
            target_minutes: hours * 60.0,
        });
    };

    let minutes = physiology::parse_target_time_minutes(target);
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(ValidationError::InvalidPace(format!(
            "Target time '{}' not understood. Use mm:ss or hh:mm:ss.",
            target
        )));
    }

    let speed = physiology::target_speed_from_time(RACE_DISTANCE_KM, minutes);
    let fraction = physiology::percent_of_vma(speed, vma)?;

    if fraction > MAX_TARGET_VMA_FRACTION {
        return Err(ValidationError::UnrealisticObjective(format!(
            "{} requires {:.1} km/h, {:.0}% of VMA {} km/h (max {:.0}%).",
            target,
            speed,
            fraction * 100.0,
            vma,
            MAX_TARGET_VMA_FRACTION * 100.0
        )));
    }
    if fraction <= FINISH_VMA_FRACTION {
        return Err(ValidationError::MissingObjectiveMode(format!(
            "{} is only {:.0}% of VMA {} km/h. Leave the target empty to train in Finish mode.",
            target,
            fraction * 100.0,
            vma
        )));
    }

    Ok(Objective {
        mode: Mode::Performance,
        label: target.to_string(),
        target_minutes: minutes,
    })
}

/// "h:mm:ss" from fractional hours, each unit truncated
fn format_hms(hours: f64) -> String {
    let h = hours as i64;
    let minutes = (hours - h as f64) * 60.0;
    let m = minutes as i64;
    let s = ((minutes - m as f64) * 60.0) as i64;
    format!("{}:{:02}:{:02}", h, m, s)
}

/// Sessions per week from the effective weekly volume
pub fn session_count_for_volume(volume_km: f64) -> usize {
    if volume_km < 30.0 {
        3
    } else if volume_km < 40.0 {
        4
    } else if volume_km < 50.0 {
        5
    } else {
        6
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumePolicy {
    pub effective_km: f64,
    pub session_count: usize,
    pub ceiling_km: f64,
}

impl VolumePolicy {
    pub fn new(requested_km: f64, mode: Mode) -> Self {
        let effective_km = requested_km.max(mode.volume_floor_km());
        Self {
            effective_km,
            session_count: session_count_for_volume(effective_km),
            ceiling_km: effective_km * WEEKLY_PROGRESSION.powi(PROGRESSION_STEPS),
        }
    }

    /// Target for a week given the previous week's target
    pub fn next_target(&self, index: usize, duration: usize, previous_km: f64) -> f64 {
        if Phase::resets_volume(index, duration) {
            self.effective_km
        } else {
            (previous_km * WEEKLY_PROGRESSION).min(self.ceiling_km)
        }
    }
}

// ---------------------------------------------------------------------------
/// Generation
// ---------------------------------------------------------------------------

pub fn validate_duration(weeks: u32) -> ValidationResult<()> {
    if !(MIN_DURATION_WEEKS..=MAX_DURATION_WEEKS).contains(&weeks) {
        return Err(ValidationError::InvalidPlanDuration(weeks));
    }
    Ok(())
}

/// Fail when the plan would run past `NaiveDate::MAX`
pub fn validate_start_date(start_date: NaiveDate, weeks: u32) -> ValidationResult<()> {
    start_date
        .checked_add_signed(Duration::weeks(weeks as i64))
        .map(|_| ())
        .ok_or(ValidationError::InvalidStartDate(start_date))
}

/// Build a complete plan, or fail on the first invalid input
pub fn generate(profile: &RunnerProfile, params: &PlanParameters) -> ValidationResult<Plan> {
    profile.validate()?;
    validate_duration(params.duration_weeks)?;
    validate_start_date(params.start_date, params.duration_weeks)?;
    let objective = resolve_objective(profile, params)?;
    let policy = VolumePolicy::new(profile.weekly_volume_km, objective.mode);

    info!(
        "Generating {}-week plan for {}: objective {} ({} mode)",
        params.duration_weeks,
        profile.full_name(),
        objective.label,
        objective.mode
    );
    debug!(
        "Volume policy: effective {:.1} km, {} sessions/week, ceiling {:.1} km",
        policy.effective_km, policy.session_count, policy.ceiling_km
    );

    let duration = params.duration_weeks as usize;
    let mut weeks = Vec::with_capacity(duration);
    let mut previous_km = policy.effective_km;

    for index in 0..duration {
        let anchor = params.start_date + Duration::weeks(index as i64);
        let phase = Phase::for_week(index, duration);

        let week = if phase == Phase::Race {
            build_race_week(profile, &objective, &policy, index, anchor)
        } else {
            let target_km = policy.next_target(index, duration, previous_km);
            previous_km = target_km;
            build_training_week(profile, objective.mode, &policy, index, anchor, phase, target_km)
        };

        debug!(
            "Week {} ({}): {} sessions, {:.1} km",
            week.number,
            phase,
            week.non_rest_count(),
            week.total_planned_km()
        );
        weeks.push(week);
    }

    Ok(Plan {
        name: format!("10 km plan - {}", profile.full_name()),
        start_date: params.start_date,
        objective: objective.label,
        weeks,
    })
}

fn day_date(anchor: NaiveDate, slot: usize) -> NaiveDate {
    anchor + Duration::days(slot as i64)
}

fn build_training_week(
    profile: &RunnerProfile,
    mode: Mode,
    policy: &VolumePolicy,
    index: usize,
    anchor: NaiveDate,
    phase: Phase,
    target_km: f64,
) -> Week {
    let pattern = day_pattern(mode, policy.session_count, phase).unwrap_or_default();
    let slots = day_slots(policy.session_count);

    // One instance per quality type; repeated days get their own copy
    let mut quality: Vec<Session> = Vec::new();
    for session_type in pattern.iter().filter(|t| t.is_quality()) {
        if !quality.iter().any(|s| s.session_type == *session_type) {
            if let Some(session) = sessions::build_quality(*session_type, anchor, profile, index) {
                quality.push(session);
            }
        }
    }

    let quality_km: f64 = pattern
        .iter()
        .filter_map(|t| quality.iter().find(|s| s.session_type == *t))
        .map(|s| s.planned_distance_km)
        .sum();

    let easy_count = pattern.iter().filter(|t| **t == SessionType::EasyRun).count();
    let easy_km = if easy_count > 0 {
        ((target_km - quality_km) / easy_count as f64).max(sessions::MIN_EASY_RUN_KM)
    } else {
        sessions::MIN_EASY_RUN_KM
    };

    let mut days: [Option<Session>; DAYS_PER_WEEK] = Default::default();
    for (&slot, &session_type) in slots.iter().zip(pattern) {
        let date = day_date(anchor, slot);
        days[slot] = if session_type == SessionType::EasyRun {
            Some(sessions::build_easy_run(date, profile, easy_km))
        } else {
            quality
                .iter()
                .find(|s| s.session_type == session_type)
                .map(|s| s.clone().with_date(date))
        };
    }

    Week::from_slots(index as u32 + 1, anchor, days)
}

fn build_race_week(
    profile: &RunnerProfile,
    objective: &Objective,
    policy: &VolumePolicy,
    index: usize,
    anchor: NaiveDate,
) -> Week {
    let mut days: [Option<Session>; DAYS_PER_WEEK] = Default::default();

    days[6] = Some(sessions::build_race_day(day_date(anchor, 6), profile, &objective.label));
    days[5] = Some(sessions::build_pre_race_activation(day_date(anchor, 5), profile));
    if objective.mode == Mode::Performance {
        days[3] = Some(sessions::build_specific_pace(day_date(anchor, 3), profile, index));
    }

    let allocated_km: f64 = days.iter().flatten().map(|s| s.planned_distance_km).sum();
    let remaining_km = policy.effective_km - allocated_km;
    let count = policy.session_count;

    match objective.mode {
        Mode::Performance => {
            let easy_count = count.saturating_sub(3);
            let easy_km = if easy_count > 0 {
                (remaining_km / easy_count as f64).max(0.0)
            } else {
                0.0
            };
            for &slot in PERFORMANCE_RACE_EASY_SLOTS.iter().take(easy_count) {
                let date = day_date(anchor, slot);
                days[slot] = Some(sessions::build_easy_run(date, profile, easy_km));
            }
        }
        Mode::Finish => {
            let other_count = count.saturating_sub(2).max(1);
            let easy_km = (remaining_km / other_count as f64).max(sessions::MIN_EASY_RUN_KM);
            let (easy_slots, threshold_slot): (&[usize], Option<usize>) = match count {
                3 => (&[2][..], None),
                4 => (&[1, 3][..], None),
                5 => (&[0, 3][..], Some(1)),
                _ => (&[0, 1, 3][..], Some(2)),
            };
            for &slot in easy_slots {
                let date = day_date(anchor, slot);
                days[slot] = Some(sessions::build_easy_run(date, profile, easy_km));
            }
            if let Some(slot) = threshold_slot {
                days[slot] = Some(sessions::build_threshold(
                    day_date(anchor, slot),
                    profile,
                    RACE_WEEK_THRESHOLD_ROTATION,
                ));
            }
        }
    }

    Week::from_slots(index as u32 + 1, anchor, days)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
