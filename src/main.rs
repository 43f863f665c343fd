//! epoch-solver CLI
//!
//! Solve and verify epoch executions from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Solve an epoch request
//! epoch-solver solve --input request.json
//!
//! # Output the wire response as JSON
//! epoch-solver solve --input request.json --format json
//!
//! # Verify a proposed fulfillment
//! epoch-solver check --input execution.json
//!
//! # Generate a random request for testing
//! epoch-solver generate --seed 7
//! ```

use epoch_solver::core::execution::{check_execution, ExecutionSnapshot};
use epoch_solver::core::orders::{Fulfillment, OrderState};
use epoch_solver::core::pool::PoolState;
use epoch_solver::core::request::EpochRequest;
use epoch_solver::optimization::config::SolverConfig;
use epoch_solver::optimization::epoch::EpochSolver;
use epoch_solver::simulation::scenario::{generate_random_epoch, ScenarioConfig};
use serde::de::DeserializeOwned;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"epoch-solver: epoch order-execution solver for two-tranche pools

USAGE:
    epoch-solver <COMMAND> [OPTIONS]

COMMANDS:
    solve       Compute the optimal fulfillment for an epoch request
    check       Verify a fulfillment against the epoch constraints
    generate    Generate a random epoch request (for testing)
    help        Show this message

OPTIONS (solve):
    --input <FILE>      Path to JSON request {{state, orders, weights?}}
    --format <FORMAT>   Output format: text (default) or json
    --config <FILE>     JSON solver config (partial overrides allowed)

OPTIONS (check):
    --input <FILE>      Path to JSON {{state, orders, fulfillment}}
    --tolerance <AMT>   Allowed breach per constraint (default: 0)

OPTIONS (generate):
    --seed <N>          Seed for a reproducible request
    --max-order <N>     Largest requested amount per leg (default: 1000000)
    --output <FILE>     Write to file instead of stdout

Set RUST_LOG=info (or debug) for solver diagnostics.

EXAMPLES:
    epoch-solver solve --input request.json
    epoch-solver solve --input request.json --format json
    epoch-solver check --input execution.json --tolerance 0.000001
    epoch-solver generate --seed 7 --output request.json"#
    );
}

/// Input schema for `check`.
#[derive(serde::Deserialize)]
struct ExecutionFile {
    state: PoolState,
    orders: OrderState,
    fulfillment: Fulfillment,
}

#[derive(serde::Serialize)]
struct CheckOutput {
    valid: bool,
    after: ExecutionSnapshot,
    violations: Vec<String>,
}

fn read_json<T: DeserializeOwned>(path: &str) -> T {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON in '{}': {}", path, e);
        process::exit(1);
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    })
}

fn option_value(args: &[String], i: usize, flag: &str, expected: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, expected);
        process::exit(1);
    })
}

fn cmd_solve(args: &[String]) {
    let mut input_path = None;
    let mut config_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(option_value(args, i, "--input", "a file path"));
            }
            "--config" => {
                i += 1;
                config_path = Some(option_value(args, i, "--config", "a file path"));
            }
            "--format" => {
                i += 1;
                format = option_value(args, i, "--format", "'text' or 'json'");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    let config: SolverConfig = match config_path {
        Some(path) => read_json(&path),
        None => SolverConfig::default(),
    };

    let request: EpochRequest = read_json(&path);
    let solver = EpochSolver::new(config);
    let result = solver.solve_request(&request).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if format == "json" {
        println!("{}", to_json(&result));
    } else {
        println!("{}", request.state);
        println!("{}", result);
        if result.feasible {
            match result.snapshot(&request.state) {
                Ok(after) => println!("{}", after),
                Err(e) => eprintln!("Error projecting balance sheet: {}", e),
            }
        } else {
            println!("No allocation satisfies the reserve and junior ratio constraints.");
        }
    }
}

fn cmd_check(args: &[String]) {
    let mut input_path = None;
    let mut tolerance = rust_decimal::Decimal::ZERO;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(option_value(args, i, "--input", "a file path"));
            }
            "--tolerance" => {
                i += 1;
                let raw = option_value(args, i, "--tolerance", "a decimal amount");
                tolerance = raw.parse().unwrap_or_else(|e| {
                    eprintln!("Invalid tolerance '{}': {}", raw, e);
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let file: ExecutionFile = read_json(&path);
    let checked = check_execution(&file.state, &file.orders, &file.fulfillment, tolerance)
        .and_then(|violations| {
            let after = ExecutionSnapshot::project(&file.state, &file.fulfillment)?;
            Ok((violations, after))
        });
    let (violations, after) = checked.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    let output = CheckOutput {
        valid: violations.is_empty(),
        after,
        violations: violations.iter().map(|v| v.to_string()).collect(),
    };
    println!("{}", to_json(&output));

    if !output.valid {
        process::exit(2);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = ScenarioConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                config.seed = Some(
                    args.get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_else(|| {
                            eprintln!("--seed requires a number");
                            process::exit(1);
                        }),
                );
            }
            "--max-order" => {
                i += 1;
                config.max_order = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--max-order requires a number");
                        process::exit(1);
                    });
            }
            "--output" => {
                i += 1;
                output_path = Some(option_value(args, i, "--output", "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let request = generate_random_epoch(&config);
    let json = to_json(&request);

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!("Generated epoch request → {}", path);
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "solve" => cmd_solve(rest),
        "check" => cmd_check(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
