use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// food_truck_ops: grade food truck operating plans on feasibility, profit, waste, and rules.
#[derive(Parser, Debug)]
#[command(name = "food_truck_ops")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a prediction set against the cases and write a report.
    Eval {
        /// Path to the cases JSONL file.
        #[arg(long, default_value = "data/food_truck_ops_cases.jsonl")]
        cases: PathBuf,

        /// Path to the predictions JSONL file (id/menu/purchases/route).
        #[arg(long)]
        preds: PathBuf,

        /// Report output path.
        #[arg(long, default_value = "leaderboard/report.json")]
        out: PathBuf,

        /// Model name recorded in the report and leaderboard.
        #[arg(long, default_value = "unknown")]
        model: String,

        /// Record the average score in the leaderboard CSV.
        #[arg(long)]
        update_leaderboard: bool,

        /// Leaderboard CSV path.
        #[arg(long, default_value = "leaderboard/leaderboard.csv")]
        leaderboard: PathBuf,
    },

    /// Report feasibility violations without scoring.
    Check {
        /// Path to the cases JSONL file.
        #[arg(long, default_value = "data/food_truck_ops_cases.jsonl")]
        cases: PathBuf,

        /// Path to the predictions JSONL file.
        #[arg(long)]
        preds: PathBuf,

        /// Only check this case id.
        #[arg(long)]
        id: Option<String>,
    },
}
