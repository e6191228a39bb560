use std::path::PathBuf;

use clap::Parser;

use food_truck_ops_rs::models::Case;
use food_truck_ops_rs::store::load_jsonl;
use food_truck_ops_rs::telemetry;

#[derive(Parser, Debug)]
#[command(name = "validate_cases")]
#[command(about = "Check that every food truck case is well formed")]
struct Args {
    /// Path to the cases JSONL file
    #[arg(long, default_value = "data/food_truck_ops_cases.jsonl")]
    cases: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = telemetry::init(&args.log_level) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let values = match load_jsonl(&args.cases) {
        Ok(values) => values,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let total = values.len();
    let mut ok = true;
    for value in values {
        if let Err(e) = Case::from_value(value).and_then(|case| case.check()) {
            ok = false;
            println!("{}", e);
        }
    }

    if !ok {
        std::process::exit(1);
    }

    println!("validated {} cases", total);
}
