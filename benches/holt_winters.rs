//! Benchmarks for Holt-Winters fitting and the full pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sales_forecast::core::{Period, SalesRecord, TimeSeries};
use sales_forecast::models::HoltWinters;
use sales_forecast::pipeline::{run_pipeline, PipelineConfig};
use sales_forecast::seasonality::ClassicalDecomposition;
use sales_forecast::utils::{CoordinateDescent, NelderMead};

fn generate_sales(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            1000.0 + 50.0 * t + 200.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()
        })
        .collect()
}

fn series(n: usize) -> TimeSeries {
    TimeSeries::new(Period::new(2000, 1).unwrap(), generate_sales(n))
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("holt_winters_fit");

    for size in [24, 60, 120, 240].iter() {
        let ts = series(*size);

        group.bench_with_input(BenchmarkId::new("additive", size), size, |b, _| {
            let spec = HoltWinters::additive(12);
            b.iter(|| spec.fit(black_box(&ts)))
        });

        group.bench_with_input(BenchmarkId::new("multiplicative", size), size, |b, _| {
            let spec = HoltWinters::multiplicative(12);
            b.iter(|| spec.fit(black_box(&ts)))
        });
    }

    group.finish();
}

fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("solvers");
    let ts = series(120);

    group.bench_function("nelder_mead", |b| {
        let spec = HoltWinters::multiplicative(12).with_solver(NelderMead::default());
        b.iter(|| spec.fit(black_box(&ts)))
    });

    group.bench_function("coordinate_descent", |b| {
        let spec = HoltWinters::multiplicative(12).with_solver(CoordinateDescent::default());
        b.iter(|| spec.fit(black_box(&ts)))
    });

    group.finish();
}

fn bench_decomposition(c: &mut Criterion) {
    let ts = series(240);
    c.bench_function("classical_decomposition_240", |b| {
        let decomposer = ClassicalDecomposition::multiplicative(12);
        b.iter(|| decomposer.decompose(black_box(&ts)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let records: Vec<SalesRecord> = generate_sales(120)
        .into_iter()
        .enumerate()
        .map(|(i, v)| SalesRecord::new(2000 + (i / 12) as i32, (i % 12) as u32 + 1, Some(v)))
        .collect();

    group.bench_function("parallel", |b| {
        let config = PipelineConfig::default();
        b.iter(|| run_pipeline(black_box(&records), &config))
    });

    group.bench_function("sequential", |b| {
        let config = PipelineConfig::default().sequential();
        b.iter(|| run_pipeline(black_box(&records), &config))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_fit,
    bench_solvers,
    bench_decomposition,
    bench_pipeline
);
criterion_main!(benches);
