pub mod cli;
pub mod error;
pub mod models;
pub mod report;
pub mod scoring;
pub mod store;
pub mod telemetry;

pub use error::{OpsError, Result};
pub use models::{Case, Prediction, ScoreResult};
pub use scoring::{score, validate, Feasibility};
