use std::path::Path;

use chrono::Utc;
use clap::Parser;
use tracing::info;

use food_truck_ops_rs::cli::{Cli, Command};
use food_truck_ops_rs::error::Result;
use food_truck_ops_rs::report::{
    display_feasibility, display_report, evaluate_all, validate_all, EvaluationReport,
};
use food_truck_ops_rs::store::{load_cases, load_predictions, write_json, Leaderboard};
use food_truck_ops_rs::telemetry;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    match cli.command {
        Command::Eval {
            cases,
            preds,
            out,
            model,
            update_leaderboard,
            leaderboard,
        } => cmd_eval(
            &cases,
            &preds,
            &out,
            &model,
            update_leaderboard.then_some(leaderboard.as_path()),
        ),
        Command::Check { cases, preds, id } => cmd_check(&cases, &preds, id.as_deref()),
    }
}

/// Score every case and write the report.
fn cmd_eval(
    cases_path: &Path,
    preds_path: &Path,
    out: &Path,
    model: &str,
    leaderboard: Option<&Path>,
) -> Result<()> {
    let cases = load_cases(cases_path)?;
    let predictions = load_predictions(preds_path)?;
    info!(cases = cases.len(), predictions = predictions.len(), model, "evaluating");

    let summary = evaluate_all(&cases, &predictions)?;
    let now = Utc::now();
    let report = EvaluationReport::new(model, summary, now);

    write_json(out, &report)?;
    display_report(&report);
    println!("Report written to {}", out.display());

    if let Some(path) = leaderboard {
        let mut board = Leaderboard::load(path)?;
        board.record(model, report.avg_score, now);
        board.save(path)?;
        println!("Leaderboard updated: {}", path.display());
    }

    Ok(())
}

/// Print feasibility diagnostics only.
fn cmd_check(cases_path: &Path, preds_path: &Path, id: Option<&str>) -> Result<()> {
    let cases = load_cases(cases_path)?;
    let predictions = load_predictions(preds_path)?;

    let checks = validate_all(&cases, &predictions, id)?;
    display_feasibility(&checks);

    Ok(())
}
