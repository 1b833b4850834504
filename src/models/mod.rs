pub mod plan;
pub mod profile;

pub use plan::{
  Plan, PlanParameters, PlanProgress, Session, SessionStatus, SessionType, SwapError, Week,
  DAYS_PER_WEEK,
};
pub use profile::{RunnerProfile, Sex, Vma};
