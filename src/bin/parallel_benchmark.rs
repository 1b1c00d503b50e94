//! Parallel tuning benchmark runner.
//!
//! Sweeps thread/worker splits of a fixed parallelism budget across dataset
//! sizes and tuning-grid resolutions, then prints a markdown report and
//! optionally writes the JSON results artifact.
//!
//! Usage:
//!   cargo run --bin parallel_benchmark --release --features engine-xgboost -- [options]
//!
//! Options:
//!   --engine NAME      Engine to benchmark (default: xgboost)
//!   --rows LIST        Comma-separated dataset row counts (default: 1000,100000)
//!   --resolutions LIST Comma-separated tuning-grid resolutions (default: 3,5)
//!   --threads LIST     Comma-separated engine thread counts (default: 1,2,4,8)
//!   --budget N         Parallelism budget to split (default: 8)
//!   --folds N          Cross-validation folds (default: 8)
//!   --iterations N     Timed repetitions per point (default: 3)
//!   --cooldown SECS    Pause before each iteration (default: 3)
//!   --timeout SECS     Per-call timeout; omit for none
//!   --seed N           Resampling seed (default: 42)
//!   --out PATH         Write the JSON results artifact here
//!   --quick            Smaller datasets and fewer folds

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use boostbench::backend::tuning::TUNED_PARAMS;
use boostbench::testing::synthetic_regression;
use boostbench::{
    summarize, BenchmarkGrid, EngineRegistry, GridConfig, SweepConfig, SweepRunner, Verbosity,
};

const BASE_FEATURES: usize = 20;

struct Args {
    engine: String,
    rows: Vec<usize>,
    resolutions: Vec<u32>,
    threads: Vec<usize>,
    budget: usize,
    folds: u32,
    iterations: usize,
    cooldown_secs: f64,
    timeout_secs: Option<f64>,
    seed: u64,
    out: Option<PathBuf>,
    quick: bool,
}

fn parse_list<T: std::str::FromStr>(flag: &str, value: &str) -> Vec<T> {
    value
        .split(',')
        .map(|part| {
            part.trim()
                .parse()
                .unwrap_or_else(|_| panic!("invalid {flag} entry: {part}"))
        })
        .collect()
}

fn parse_args() -> Args {
    let mut args = Args {
        engine: "xgboost".to_string(),
        rows: vec![1_000, 100_000],
        resolutions: vec![3, 5],
        threads: vec![1, 2, 4, 8],
        budget: 8,
        folds: 8,
        iterations: 3,
        cooldown_secs: 3.0,
        timeout_secs: None,
        seed: 42,
        out: None,
        quick: false,
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--engine" => args.engine = it.next().expect("--engine value"),
            "--rows" => args.rows = parse_list("--rows", &it.next().expect("--rows value")),
            "--resolutions" => {
                args.resolutions =
                    parse_list("--resolutions", &it.next().expect("--resolutions value"))
            }
            "--threads" => {
                args.threads = parse_list("--threads", &it.next().expect("--threads value"))
            }
            "--budget" => args.budget = it.next().expect("--budget value").parse().unwrap(),
            "--folds" => args.folds = it.next().expect("--folds value").parse().unwrap(),
            "--iterations" => {
                args.iterations = it.next().expect("--iterations value").parse().unwrap()
            }
            "--cooldown" => {
                args.cooldown_secs = it.next().expect("--cooldown value").parse().unwrap()
            }
            "--timeout" => {
                args.timeout_secs = Some(it.next().expect("--timeout value").parse().unwrap())
            }
            "--seed" => args.seed = it.next().expect("--seed value").parse().unwrap(),
            "--out" => args.out = Some(PathBuf::from(it.next().expect("--out path"))),
            "--quick" => args.quick = true,
            "--help" => {
                eprintln!(
                    "parallel_benchmark\n\n  --engine <name>      Engine to benchmark (default: xgboost)\n  --rows <list>        Dataset row counts (default: 1000,100000)\n  --resolutions <list> Tuning-grid resolutions (default: 3,5)\n  --threads <list>     Engine thread counts (default: 1,2,4,8)\n  --budget <n>         Parallelism budget (default: 8)\n  --folds <n>          Cross-validation folds (default: 8)\n  --iterations <n>     Repetitions per point (default: 3)\n  --cooldown <secs>    Pre-iteration pause (default: 3)\n  --timeout <secs>     Per-call timeout (default: none)\n  --seed <n>           Resampling seed (default: 42)\n  --out <path>         JSON results artifact\n  --quick              Smaller datasets and fewer folds"
                );
                process::exit(0);
            }
            other => panic!("unknown arg: {other}"),
        }
    }

    if args.quick {
        args.rows = vec![500, 5_000];
        args.resolutions = vec![2];
        args.folds = 3;
        args.cooldown_secs = 0.5;
    }

    args
}

fn main() {
    let args = parse_args();

    let registry = EngineRegistry::with_builtin_engines();
    if registry.is_empty() {
        eprintln!(
            "Warning: no engine adapters compiled in; every point will be recorded as failed."
        );
        eprintln!("Rebuild with --features engine-xgboost and/or engine-lightgbm.");
    } else {
        println!("Engines: {}", registry.engine_names().join(", "));
    }

    let grid_config = match GridConfig::builder()
        .engine(args.engine.clone())
        .row_counts(args.rows.clone())
        .grid_resolutions(args.resolutions.clone())
        .thread_options(args.threads.clone())
        .parallelism_budget(args.budget)
        .cv_folds(args.folds)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid grid configuration: {e}");
            process::exit(1);
        }
    };

    let grid = match BenchmarkGrid::build(&grid_config) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Invalid grid configuration: {e}");
            process::exit(1);
        }
    };

    // Resamples are drawn with replacement from this fixed pool.
    let base_rows = args.rows.iter().copied().max().unwrap_or(1_000);
    let base = synthetic_regression(base_rows, BASE_FEATURES, args.seed, 0.05);

    println!(
        "=== Parallel Tuning Benchmark ===\nEngine: {}  Budget: {}  Points: {}  Iterations: {}\n",
        args.engine,
        args.budget,
        grid.len(),
        args.iterations
    );

    let sweep_config = SweepConfig {
        iterations: args.iterations,
        cooldown: Duration::from_secs_f64(args.cooldown_secs),
        timeout: args.timeout_secs.map(Duration::from_secs_f64),
        seed: args.seed,
        verbosity: Verbosity::Progress,
    };

    let runner = SweepRunner::new(&registry, sweep_config);
    let results = runner.run(&grid, &base);
    let report = summarize(&results, TUNED_PARAMS);

    if let Some(path) = &args.out {
        if let Err(e) = report.save(path) {
            eprintln!("Failed to write results artifact: {e}");
            process::exit(1);
        }
        println!("\nResults written to: {}", path.display());
    }

    println!("\n{}", report.to_markdown());
}
