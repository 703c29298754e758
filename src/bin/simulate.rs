//! Mission pipeline simulator CLI.
//!
//! Run Monte Carlo batches through the generate-validate-repair loop and
//! the spawn runtime to check catalog balance.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                     # Default: 200 runs per difficulty
//!   cargo run --bin simulate -- -n 50            # 50 runs per difficulty
//!   cargo run --bin simulate -- --seed 42        # Reproducible batch
//!   cargo run --bin simulate -- --json           # Also write a JSON report

use mythos::simulator::{run_simulation, SimConfig};
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);

    println!("MYTHOS MISSION PIPELINE SIMULATOR");
    println!();
    println!("Configuration:");
    println!("  Runs/difficulty: {}", config.runs_per_difficulty);
    println!("  Board tiles:     {}", config.board_tiles);
    println!("  Attempt cap:     {}", config.max_generation_attempts);
    if let Some(seed) = config.seed {
        println!("  Seed:            {}", seed);
    }
    println!();
    println!("Running simulation...");
    println!();

    let report = run_simulation(&config);
    println!("{}", report.to_text());

    if args.iter().any(|a| a == "--json") {
        let filename = format!(
            "sim_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        match std::fs::write(&filename, report.to_json()) {
            Ok(()) => println!("Report written to {}", filename),
            Err(e) => eprintln!("Could not write {}: {}", filename, e),
        }
    }
}

fn parse_args(args: &[String]) -> SimConfig {
    let mut config = SimConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if let Some(value) = args.get(i + 1).and_then(|s| s.parse().ok()) {
                    config.runs_per_difficulty = value;
                    i += 1;
                }
            }
            "--seed" => {
                if let Some(value) = args.get(i + 1).and_then(|s| s.parse().ok()) {
                    config.seed = Some(value);
                    i += 1;
                }
            }
            "--tiles" => {
                if let Some(value) = args.get(i + 1).and_then(|s| s.parse().ok()) {
                    config.board_tiles = value;
                    i += 1;
                }
            }
            "-v" | "--verbose" => config.verbosity = 2,
            _ => {}
        }
        i += 1;
    }
    config
}
