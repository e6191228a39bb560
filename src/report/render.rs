use crate::report::batch::EvaluationReport;
use crate::scoring::Feasibility;

/// Display a batch report as a per-case table.
pub fn display_report(report: &EvaluationReport) {
    if report.results.is_empty() {
        println!("No cases evaluated.");
        return;
    }

    println!();
    println!("=== {} ===", report.model);
    println!();

    let max_id_len = report.results.iter().map(|r| r.id.len()).max().unwrap_or(4);

    for outcome in &report.results {
        let r = &outcome.result;
        if r.feasible {
            let mut line = format!(
                "  {:<width$}  total {:>6.2} | profit {:>5.2} waste {:>5.2} rules {:>5.2}",
                outcome.id,
                r.total,
                r.profit_score,
                r.waste_score,
                r.constraint_score,
                width = max_id_len
            );
            if !r.constraint_failures.is_empty() {
                line.push_str(&format!("  [{} rule(s) failed]", r.constraint_failures.len()));
            }
            println!("{line}");
        } else {
            println!(
                "  {:<width$}  total {:>6.2} | INFEASIBLE: {}",
                outcome.id,
                r.total,
                r.violations.join("; "),
                width = max_id_len
            );
        }
    }

    println!();
    println!("--- Summary ---");
    println!("Cases: {}", report.results.len());
    println!(
        "Feasible: {}",
        report.results.iter().filter(|r| r.result.feasible).count()
    );
    if !report.missing.is_empty() {
        println!("Missing predictions: {}", report.missing.join(", "));
    }
    println!("Average score: {:.2}", report.avg_score);
    println!();
}

/// Display feasibility diagnostics, one block per case.
pub fn display_feasibility(checks: &[(String, Feasibility)]) {
    if checks.is_empty() {
        println!("No cases matched.");
        return;
    }

    for (id, feasibility) in checks {
        if feasibility.feasible {
            println!("{id}: feasible");
            continue;
        }
        println!("{id}: infeasible");
        for reason in feasibility.reasons() {
            println!("  - {reason}");
        }
    }

    let feasible = checks.iter().filter(|(_, f)| f.feasible).count();
    println!();
    println!("{feasible}/{} plans feasible", checks.len());
}
