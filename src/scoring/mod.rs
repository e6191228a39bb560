pub mod aggregate;
pub mod constants;
pub mod feasibility;
pub mod rules;
pub mod simulation;

pub use aggregate::{profit_score, score, validate, waste_score};
pub use constants::*;
pub use feasibility::{check_plan, suggest, Feasibility, Violation};
pub use rules::{evaluate, RuleOutcome};
pub use simulation::{simulate, Sales};
