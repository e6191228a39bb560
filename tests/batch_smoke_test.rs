use std::fs;
use std::io::Write;

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use food_truck_ops_rs::models::{Case, PredictionRecord};
use food_truck_ops_rs::report::{evaluate_all, validate_all, EvaluationReport};
use food_truck_ops_rs::store::{load_cases, load_predictions, write_json, Leaderboard};
use food_truck_ops_rs::OpsError;

fn case_line(id: &str, budget: f64) -> Value {
    json!({
        "id": id,
        "hours": ["09", "10", "11"],
        "budget": budget,
        "capacity_units": 100,
        "locations": {"Stand": {"09": 5, "10": 5, "11": 5}},
        "menu_items": {"Wrap": {"price": 10, "ingredients": {"wrap": 1}}},
        "ingredients": {"wrap": {"unit_cost": 2, "storage_units": 1}},
        "constraints": [],
        "profit_scale": 150
    })
}

fn plan_line(id: &str) -> Value {
    json!({
        "id": id,
        "menu": [{"item": "Wrap"}],
        "purchases": {"wrap": 15},
        "route": [{"location": "Stand", "hours": ["09", "10", "11"]}]
    })
}

fn jsonl(lines: &[Value]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_batch_scores_in_case_order() {
    let cases = jsonl(&[
        case_line("a", 100.0),
        case_line("b", 20.0),
        case_line("c", 100.0),
        case_line("d", 100.0),
    ]);
    let preds = jsonl(&[
        plan_line("c"),
        plan_line("a"),
        plan_line("b"),
        json!({"id": "d", "menu": [{"item": "Wrap"}]}),
        json!({"menu": [], "purchases": {}, "route": []}),
    ]);

    let cases = load_cases(cases.path()).unwrap();
    let predictions = load_predictions(preds.path()).unwrap();
    let summary = evaluate_all(&cases, &predictions).unwrap();

    let ids: Vec<&str> = summary.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);

    assert_eq!(summary.results[0].result.total, 88.0);
    assert_eq!(summary.results[1].result.total, 0.0);
    assert!(summary.results[1].result.violations[0].starts_with("budget exceeded"));
    assert_eq!(summary.results[2].result.total, 88.0);

    let malformed = &summary.results[3];
    assert_eq!(malformed.error.as_deref(), Some("malformed_plan"));
    assert!(malformed.result.violations[0].starts_with("malformed prediction"));

    assert!(summary.missing.is_empty());
    assert_eq!(summary.avg_score, 44.0);
}

#[test]
fn test_missing_predictions_listed() {
    let cases: Vec<Case> = vec![
        serde_json::from_value(case_line("a", 100.0)).unwrap(),
        serde_json::from_value(case_line("b", 100.0)).unwrap(),
    ];
    let predictions = vec![PredictionRecord::from_value(plan_line("a"))];

    let summary = evaluate_all(&cases, &predictions).unwrap();
    assert_eq!(summary.missing, vec!["b"]);
    assert_eq!(summary.results[1].error.as_deref(), Some("missing_plan"));
    assert_eq!(summary.avg_score, 44.0);
}

#[test]
fn test_numeric_ids_match_across_files() {
    let mut case_value = case_line("x", 100.0);
    case_value["id"] = json!(7);
    let mut plan_value = plan_line("x");
    plan_value["id"] = json!(7);

    let cases = load_cases(jsonl(&[case_value]).path()).unwrap();
    let predictions = load_predictions(jsonl(&[plan_value]).path()).unwrap();
    let summary = evaluate_all(&cases, &predictions).unwrap();

    assert_eq!(summary.results[0].id, "7");
    assert!(summary.missing.is_empty());
    assert_eq!(summary.results[0].result.total, 88.0);
}

#[test]
fn test_invalid_case_aborts_batch() {
    let mut bad = case_line("bad", 100.0);
    bad["profit_scale"] = json!(-5);
    let cases: Vec<Case> = vec![serde_json::from_value(bad).unwrap()];
    let predictions = vec![PredictionRecord::from_value(plan_line("bad"))];

    match evaluate_all(&cases, &predictions) {
        Err(OpsError::InvalidCase { id, .. }) => assert_eq!(id, "bad"),
        other => panic!("expected InvalidCase, got {other:?}"),
    }
}

#[test]
fn test_validate_all_filters_by_id() {
    let cases: Vec<Case> = vec![
        serde_json::from_value(case_line("a", 100.0)).unwrap(),
        serde_json::from_value(case_line("b", 20.0)).unwrap(),
    ];
    let predictions: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|id| PredictionRecord::from_value(plan_line(id)))
        .collect();

    let all = validate_all(&cases, &predictions, None).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].1.feasible);
    assert!(!all[1].1.feasible);

    let only_b = validate_all(&cases, &predictions, Some("b")).unwrap();
    assert_eq!(only_b.len(), 1);
    assert_eq!(only_b[0].0, "b");
}

#[test]
fn test_report_and_leaderboard_written() {
    let cases: Vec<Case> = vec![serde_json::from_value(case_line("a", 100.0)).unwrap()];
    let predictions = vec![PredictionRecord::from_value(plan_line("a"))];
    let summary = evaluate_all(&cases, &predictions).unwrap();

    let at = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();
    let report = EvaluationReport::new("demo/model", summary, at);

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("leaderboard").join("report.json");
    write_json(&report_path, &report).unwrap();

    let written: Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(written["model"], "demo/model");
    assert_eq!(written["generated_at"], "2026-10-14T12:00:00Z");
    assert_eq!(written["avg_score"], 88.0);
    assert_eq!(written["results"][0]["id"], "a");
    assert_eq!(written["results"][0]["total"], 88.0);
    assert_eq!(written["results"][0]["feasible"], true);
    assert!(written["results"][0].get("error").is_none());

    let board_path = dir.path().join("leaderboard").join("leaderboard.csv");
    let mut board = Leaderboard::load(&board_path).unwrap();
    board.record("demo/model", report.avg_score, at);
    board.save(&board_path).unwrap();

    let mut board = Leaderboard::load(&board_path).unwrap();
    board.record("other/model", 12.5, at);
    board.record("demo/model", 90.0, at);
    board.save(&board_path).unwrap();

    let content = fs::read_to_string(&board_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "model,avg_score,last_run",
            "demo/model,90.00,2026-10-14T12:00:00Z",
            "other/model,12.50,2026-10-14T12:00:00Z",
        ]
    );
}
