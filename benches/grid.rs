//! Harness overhead benchmarks: grid expansion and report aggregation.
//!
//! Run with: `cargo bench --bench grid`

use std::time::Duration;

use boostbench::{summarize, BenchmarkGrid, GridConfig, ParameterPoint, TrialResult};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn wide_config() -> GridConfig {
    GridConfig::builder()
        .engine("xgboost")
        .row_counts((1..=20).map(|i| i * 5_000).collect())
        .grid_resolutions((1..=10).collect())
        .thread_options(vec![1, 2, 4, 8, 16, 32])
        .parallelism_budget(32)
        .build()
        .unwrap()
}

fn synthetic_results(grid: &BenchmarkGrid) -> Vec<(ParameterPoint, TrialResult)> {
    grid.iter()
        .enumerate()
        .map(|(i, point)| {
            let base = Duration::from_millis(100 + i as u64);
            (
                point.clone(),
                TrialResult {
                    elapsed: vec![base, base * 2, base * 3],
                    requested: 3,
                    failures: vec![],
                },
            )
        })
        .collect()
}

fn bench_grid_build(c: &mut Criterion) {
    let config = wide_config();
    c.bench_function("grid/build", |b| {
        b.iter(|| BenchmarkGrid::build(black_box(&config)).unwrap())
    });
}

fn bench_summarize(c: &mut Criterion) {
    let grid = BenchmarkGrid::build(&wide_config()).unwrap();
    let results = synthetic_results(&grid);
    c.bench_function("report/summarize", |b| {
        b.iter(|| summarize(black_box(&results), 2))
    });
}

criterion_group!(benches, bench_grid_build, bench_summarize);
criterion_main!(benches);
