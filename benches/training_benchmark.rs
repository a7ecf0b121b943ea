//! Benchmark for churn model training and dashboard aggregation
//!
//! Run with: cargo bench --bench training_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use churnscope::pipeline::{build_dashboard, train_model, TARGET_COLUMN};

/// Generate a synthetic customer table with numeric and categorical columns
fn generate_customers(n_rows: usize, seed: u64) -> DataFrame {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let genders = ["F", "M"];
    let personas = ["Saver", "Spender", "Revolver", "Transactor"];
    let incomes = ["Low", "Mid", "High"];
    let tenure_groups = ["0-6m", "6-12m", "1-2y", "2y+"];

    let spend: Vec<f64> = (0..n_rows).map(|_| rng.gen::<f64>() * 10_000.0).collect();
    let tenure: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(0.0..120.0)).collect();
    let flag: Vec<i32> = spend
        .iter()
        .zip(&tenure)
        .map(|(s, t)| {
            let risk = if *s < 2_000.0 && *t < 24.0 { 0.7 } else { 0.1 };
            (rng.gen::<f64>() < risk) as i32
        })
        .collect();

    let pick = |rng: &mut StdRng, options: &[&str]| -> Vec<String> {
        (0..n_rows)
            .map(|_| options[rng.gen_range(0..options.len())].to_string())
            .collect()
    };

    let columns = vec![
        Column::new(TARGET_COLUMN.into(), flag),
        Column::new("totalspend".into(), spend),
        Column::new("tenure".into(), tenure),
        Column::new(
            "totaltransactions".into(),
            (0..n_rows).map(|_| rng.gen_range(0.0..600.0)).collect::<Vec<f64>>(),
        ),
        Column::new(
            "utilizationrate".into(),
            (0..n_rows).map(|_| rng.gen::<f64>()).collect::<Vec<f64>>(),
        ),
        Column::new("gender".into(), pick(&mut rng, &genders)),
        Column::new("persona".into(), pick(&mut rng, &personas)),
        Column::new("income_bucket".into(), pick(&mut rng, &incomes)),
        Column::new("tenuregroup".into(), pick(&mut rng, &tenure_groups)),
    ];

    DataFrame::new(columns).expect("Failed to create DataFrame")
}

/// Benchmark model training on the numeric columns for varying table sizes
fn benchmark_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_training");
    group.sample_size(10);

    for n_rows in [1_000, 5_000, 20_000] {
        let df = generate_customers(n_rows, 42)
            .select([TARGET_COLUMN, "totalspend", "tenure", "totaltransactions", "utilizationrate"])
            .expect("Failed to select numeric columns");
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::new("boosted_trees", n_rows), &df, |b, df| {
            b.iter(|| {
                let _ = train_model(black_box(df), black_box(TARGET_COLUMN), None);
            });
        });
    }

    group.finish();
}

/// Benchmark building the full dashboard
fn benchmark_dashboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard");

    for n_rows in [10_000, 100_000] {
        let df = generate_customers(n_rows, 7);
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::new("build", n_rows), &df, |b, df| {
            b.iter(|| {
                let _ = build_dashboard(black_box(df), black_box(TARGET_COLUMN));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_training, benchmark_dashboard);
criterion_main!(benches);
