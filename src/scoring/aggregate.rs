use tracing::debug;

use crate::error::Result;
use crate::models::{Case, Prediction, ProfitScale, ScoreResult};
use crate::scoring::constants::*;
use crate::scoring::feasibility::{check_plan, Feasibility};
use crate::scoring::rules::evaluate;
use crate::scoring::simulation::simulate;

/// Profit component: share of the profit scale reached, in [0, 60].
pub fn profit_score(scale: &ProfitScale, profit: f64) -> f64 {
    clamp_score(scale.ratio(profit) * PROFIT_WEIGHT, PROFIT_WEIGHT)
}

/// Waste component: share of spend actually consumed, in [0, 20].
///
/// Buying nothing wastes nothing.
pub fn waste_score(leftover_cost: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        clamp_score(WASTE_WEIGHT * (1.0 - leftover_cost / cost), WASTE_WEIGHT)
    } else {
        WASTE_WEIGHT
    }
}

/// Feasibility check on its own, for diagnostics.
///
/// Fails only when the case itself is malformed.
pub fn validate(case: &Case, prediction: &Prediction) -> Result<Feasibility> {
    case.check()?;
    Ok(check_plan(case, prediction))
}

/// Grade a plan against a case.
///
/// Infeasible plans score zero with their violations listed; `Err` is
/// reserved for malformed cases.
pub fn score(case: &Case, prediction: &Prediction) -> Result<ScoreResult> {
    let feasibility = validate(case, prediction)?;
    if !feasibility.feasible {
        debug!(
            case = %case.id,
            violations = feasibility.violations.len(),
            "plan infeasible"
        );
        return Ok(ScoreResult::infeasible(feasibility.reasons()));
    }

    let sales = simulate(case, prediction);
    let rules = evaluate(case, prediction);

    let profit_score = profit_score(&case.profit_scale, sales.profit);
    let waste_score = waste_score(sales.leftover_cost, sales.cost);
    let constraint_score = rules.score();
    let total = clamp_score(profit_score + waste_score + constraint_score, MAX_TOTAL);

    debug!(
        case = %case.id,
        total,
        profit_score,
        waste_score,
        constraint_score,
        "plan scored"
    );

    Ok(ScoreResult {
        total,
        profit_score,
        waste_score,
        constraint_score,
        feasible: true,
        violations: Vec::new(),
        profit: sales.profit,
        revenue: sales.revenue,
        cost: sales.cost,
        leftover_cost: sales.leftover_cost,
        constraint_failures: rules.failures,
        config_errors: rules.config_errors,
        units_sold: sales.units_sold,
    })
}
