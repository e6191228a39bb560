pub mod batch;
pub mod render;

pub use batch::{evaluate_all, validate_all, BatchSummary, CaseOutcome, EvaluationReport};
pub use render::{display_feasibility, display_report};
