use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

use coach10k::commands::{plan as plan_cmd, weather as weather_cmd};
use coach10k::{
  AppState, Plan, PlanParameters, PlanProgress, RunnerProfile, SessionStatus, Sex, Vma, Week,
};

#[derive(Debug, Parser)]
#[command(name = "coach10k", version, about = "10 km training plan generator")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Generate a plan from a runner profile
  Generate(GenerateArgs),
  /// List saved profiles
  List,
  /// Show a saved profile and its plan
  Show {
    slug: String,
    /// Append the forecast for the profile's city
    #[arg(long)]
    weather: bool,
  },
  /// Delete a saved profile and its plan
  Delete { slug: String },
  /// Record the outcome of a session
  Mark {
    slug: String,
    /// Session date (YYYY-MM-DD)
    date: NaiveDate,
    /// planned, completed or missed
    status: SessionStatus,
    #[arg(long, default_value = "")]
    reason: String,
  },
  /// Swap two days of a week in a saved plan
  Swap {
    slug: String,
    /// Week number, starting at 1
    week: u32,
    /// Day index in the week (0-6)
    a: usize,
    /// Day index in the week (0-6)
    b: usize,
  },
}

#[derive(Debug, Args)]
struct GenerateArgs {
  #[arg(long)]
  first_name: String,
  #[arg(long)]
  last_name: String,
  #[arg(long)]
  city: Option<String>,
  #[arg(long)]
  age: u32,
  #[arg(long)]
  sex: Sex,
  #[arg(long)]
  height_cm: f64,
  #[arg(long)]
  weight_kg: f64,
  /// Maximal aerobic speed, km/h
  #[arg(long)]
  vma: f64,
  #[arg(long)]
  max_hr: i32,
  #[arg(long)]
  rest_hr: i32,
  /// Current weekly volume, km
  #[arg(long)]
  volume: f64,
  /// Plan length, 6 to 10 weeks
  #[arg(long, default_value_t = 8)]
  weeks: u32,
  /// First day of the plan (YYYY-MM-DD), defaults to today
  #[arg(long)]
  start: Option<NaiveDate>,
  /// Target time (mm:ss or hh:mm:ss); omit to train to finish
  #[arg(long)]
  target: Option<String>,
  /// Save profile and plan
  #[arg(long)]
  save: bool,
  /// Show the forecast for the runner's city
  #[arg(long)]
  weather: bool,
}

impl GenerateArgs {
  fn into_inputs(self) -> Result<(RunnerProfile, PlanParameters, bool, bool), String> {
    let today = Local::now().date_naive();
    let start = self.start.unwrap_or(today);
    if start < today {
      return Err(format!("Start date {} is in the past", start));
    }

    let profile = RunnerProfile {
      first_name: self.first_name.trim().to_string(),
      last_name: self.last_name.trim().to_string(),
      city: self.city.filter(|c| !c.trim().is_empty()),
      age: self.age,
      sex: self.sex,
      height_cm: self.height_cm,
      weight_kg: self.weight_kg,
      vma: Vma::new(self.vma).map_err(|e| e.to_string())?,
      max_hr: self.max_hr,
      rest_hr: self.rest_hr,
      weekly_volume_km: self.volume,
    };
    let params = PlanParameters::new(self.weeks, start, self.target);
    Ok((profile, params, self.save, self.weather))
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  dotenvy::dotenv().ok();
  coach10k::init_tracing();

  let cli = Cli::parse();
  let state = match coach10k::initialize().await {
    Ok(state) => state,
    Err(e) => {
      eprintln!("Failed to initialize: {}", e);
      return ExitCode::FAILURE;
    }
  };

  match run(&state, cli.command).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("Error: {}", e);
      ExitCode::FAILURE
    }
  }
}

async fn run(state: &AppState, command: Command) -> Result<(), String> {
  match command {
    Command::Generate(args) => {
      let (profile, params, save, weather) = args.into_inputs()?;
      print_profile(&profile)?;

      let city = profile.city.clone();
      let generated = plan_cmd::generate_plan(state, profile, params, save).await?;
      print_plan(&generated.plan, &generated.progress);
      if let Some(slug) = &generated.slug {
        println!("\nSaved as {}", slug);
      }

      if weather {
        match city {
          Some(city) => {
            let forecast = weather_cmd::get_forecast(state, &city).await?;
            print_lines(&coach10k::weather::annotate(&generated.plan, &forecast));
          }
          None => println!("\nNo city given, no forecast."),
        }
      }
    }
    Command::List => {
      let profiles = plan_cmd::list_profiles(state).await?;
      if profiles.is_empty() {
        println!("No saved profiles.");
      }
      for p in profiles {
        println!(
          "{:<30} {:<25} {}",
          p.slug,
          p.full_name,
          p.plan_name.unwrap_or_else(|| "-".to_string())
        );
      }
    }
    Command::Show { slug, weather } => {
      let saved = plan_cmd::get_profile(state, &slug).await?;
      print_profile(&saved.profile)?;
      match &saved.plan {
        Some(plan) => print_plan(plan, &PlanProgress::compute(plan)),
        None => println!("\nNo plan stored."),
      }
      if weather {
        print_lines(&weather_cmd::plan_weather(state, &slug).await?);
      }
    }
    Command::Delete { slug } => {
      plan_cmd::delete_profile(state, &slug).await?;
      println!("Deleted {}", slug);
    }
    Command::Mark {
      slug,
      date,
      status,
      reason,
    } => {
      let progress = plan_cmd::mark_session(state, &slug, date, status, &reason).await?;
      println!(
        "{} on {}. Completion {:.0}% ({}/{} sessions)",
        status, date, progress.completion_pct, progress.total_completed, progress.total_expected
      );
    }
    Command::Swap { slug, week, a, b } => {
      let week = plan_cmd::swap_days(state, &slug, week, a, b).await?;
      print_week(&week);
    }
  }
  Ok(())
}

fn print_profile(profile: &RunnerProfile) -> Result<(), String> {
  let report = plan_cmd::profile_report(profile)?;
  println!("{}", report.full_name);
  println!("  BMI {:.1}, estimated VO2max {:.1} ml/kg/min", report.bmi, report.vo2max);
  println!("  Easy        {}", report.easy_pace);
  println!("  Threshold   {}", report.threshold_pace);
  println!("  10k pace    {}", report.specific_pace);
  println!("  VMA         {}", report.vma_pace);
  println!("  Walk (rec.) {}", report.recovery_walk_pace);
  Ok(())
}

fn print_plan(plan: &Plan, progress: &PlanProgress) {
  println!("\n{} (objective {})", plan.name, plan.objective);
  for week in &plan.weeks {
    print_week(week);
  }
  println!(
    "\n{} sessions, {:.1} km planned; {} completed, {} missed ({:.0}%)",
    progress.total_expected,
    progress.planned_km,
    progress.total_completed,
    progress.total_missed,
    progress.completion_pct
  );
}

fn print_week(week: &Week) {
  println!("\nWeek {} - {:.1} km", week.number, week.total_planned_km());
  for s in &week.sessions {
    if s.is_rest() {
      println!("  {}  Rest", s.date.format("%a %d/%m"));
      continue;
    }
    println!(
      "  {}  {:<10} {} min, {:.1} km [{}] ({})",
      s.date.format("%a %d/%m"),
      s.session_type.label(),
      s.planned_duration_min,
      s.planned_distance_km,
      s.status,
      s.target_intensity
    );
    println!("              {}", s.description);
    if !s.cancellation_reason.is_empty() {
      println!("              missed: {}", s.cancellation_reason);
    }
  }
}

fn print_lines(lines: &[String]) {
  println!("\nForecast");
  if lines.is_empty() {
    println!("  No forecast for the plan dates.");
  }
  for line in lines {
    println!("  {}", line);
  }
}
