use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{round_to, Case, PredictionRecord, ScoreResult};
use crate::scoring::{score, validate, Feasibility, Violation, REPORT_DECIMALS};

/// A graded case within a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    pub id: String,

    /// Why the case could not be graded normally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(flatten)]
    pub result: ScoreResult,
}

/// Scores of one prediction set against a case set.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub avg_score: f64,
    pub results: Vec<CaseOutcome>,
    /// Case ids with no prediction.
    pub missing: Vec<String>,
}

/// Index predictions by id; later records win, records without id are dropped.
fn index_predictions(predictions: &[PredictionRecord]) -> HashMap<&str, &PredictionRecord> {
    let mut index = HashMap::new();
    for record in predictions {
        match record.id.as_deref() {
            Some(id) => {
                index.insert(id, record);
            }
            None => warn!("ignoring prediction without id"),
        }
    }
    index
}

fn grade(case: &Case, record: Option<&PredictionRecord>) -> Result<CaseOutcome> {
    case.check()?;
    let (error, result) = match record.map(|r| &r.plan) {
        None => (
            Some("missing_plan".to_string()),
            ScoreResult::infeasible(vec![Violation::MissingPrediction.to_string()]),
        ),
        Some(Err(reason)) => (
            Some("malformed_plan".to_string()),
            ScoreResult::infeasible(vec![
                Violation::MalformedPrediction(reason.clone()).to_string(),
            ]),
        ),
        Some(Ok(plan)) => (None, score(case, plan)?),
    };

    Ok(CaseOutcome {
        id: case.id.clone(),
        error,
        result,
    })
}

/// Grade every case against its prediction, in parallel.
///
/// Results come back in case order. A malformed case aborts the batch.
pub fn evaluate_all(cases: &[Case], predictions: &[PredictionRecord]) -> Result<BatchSummary> {
    let index = index_predictions(predictions);

    let results: Vec<CaseOutcome> = cases
        .par_iter()
        .map(|case| grade(case, index.get(case.id.as_str()).copied()))
        .collect::<Result<_>>()?;

    let missing: Vec<String> = results
        .iter()
        .filter(|r| r.error.as_deref() == Some("missing_plan"))
        .map(|r| r.id.clone())
        .collect();
    for id in &missing {
        warn!(case = %id, "no prediction for case");
    }

    let avg_score =
        results.iter().map(|r| r.result.total).sum::<f64>() / results.len().max(1) as f64;

    info!(
        cases = results.len(),
        missing = missing.len(),
        avg_score,
        "batch evaluated"
    );

    Ok(BatchSummary {
        avg_score,
        results,
        missing,
    })
}

/// Feasibility of each prediction, optionally restricted to one case id.
pub fn validate_all(
    cases: &[Case],
    predictions: &[PredictionRecord],
    only: Option<&str>,
) -> Result<Vec<(String, Feasibility)>> {
    let index = index_predictions(predictions);

    cases
        .iter()
        .filter(|case| only.is_none_or(|id| id == case.id))
        .map(|case| -> Result<(String, Feasibility)> {
            case.check()?;
            let feasibility = match index.get(case.id.as_str()).map(|r| &r.plan) {
                None => Feasibility::from_violations(vec![Violation::MissingPrediction]),
                Some(Err(reason)) => Feasibility::from_violations(vec![
                    Violation::MalformedPrediction(reason.clone()),
                ]),
                Some(Ok(plan)) => validate(case, plan)?,
            };
            Ok((case.id.clone(), feasibility))
        })
        .collect()
}

/// The written form of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub model: String,
    pub generated_at: String,
    pub avg_score: f64,
    pub results: Vec<CaseOutcome>,
    pub missing: Vec<String>,
}

impl EvaluationReport {
    /// Build the report, rounding figures for display.
    pub fn new(model: &str, summary: BatchSummary, generated_at: DateTime<Utc>) -> Self {
        Self {
            model: model.to_string(),
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            avg_score: round_to(summary.avg_score, REPORT_DECIMALS),
            results: summary
                .results
                .into_iter()
                .map(|outcome| CaseOutcome {
                    result: outcome.result.rounded(REPORT_DECIMALS),
                    ..outcome
                })
                .collect(),
            missing: summary.missing,
        }
    }
}
