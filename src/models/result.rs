use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Graded breakdown for one (case, prediction) pair.
///
/// Either a fully computed breakdown or a declared infeasible zero with the
/// reasons listed in `violations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Overall score in [0, 100].
    pub total: f64,

    /// Profit component in [0, 60].
    pub profit_score: f64,

    /// Waste component in [0, 20].
    pub waste_score: f64,

    /// Business rule component in [0, 20].
    pub constraint_score: f64,

    pub feasible: bool,

    pub violations: Vec<String>,

    pub profit: f64,
    pub revenue: f64,
    pub cost: f64,
    pub leftover_cost: f64,

    /// Rules the plan failed.
    #[serde(default)]
    pub constraint_failures: Vec<String>,

    /// Constraint records the engine could not interpret.
    #[serde(default)]
    pub config_errors: Vec<String>,

    /// Units sold per selected item.
    #[serde(default)]
    pub units_sold: BTreeMap<String, u64>,
}

impl ScoreResult {
    /// An infeasible plan earns nothing; only the reasons are kept.
    pub fn infeasible(violations: Vec<String>) -> Self {
        Self {
            feasible: false,
            violations,
            ..Default::default()
        }
    }

    /// Copy with every score and money figure rounded for reporting.
    pub fn rounded(&self, decimals: u32) -> Self {
        let round = |value: f64| round_to(value, decimals);
        Self {
            total: round(self.total),
            profit_score: round(self.profit_score),
            waste_score: round(self.waste_score),
            constraint_score: round(self.constraint_score),
            profit: round(self.profit),
            revenue: round(self.revenue),
            cost: round(self.cost),
            leftover_cost: round(self.leftover_cost),
            ..self.clone()
        }
    }
}

/// Round a float to n decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}
