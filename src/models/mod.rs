pub mod case;
pub mod constraint;
mod id;
pub mod prediction;
pub mod result;

pub use case::{Case, Ingredient, MenuItem, ProfitScale};
pub use constraint::{Constraint, Rule};
pub use prediction::{MenuChoice, Prediction, PredictionRecord, RouteBlock};
pub use result::{round_to, ScoreResult};
