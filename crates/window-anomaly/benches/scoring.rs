//! Benchmark suite for window scoring.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use window_anomaly::{
    label_points, make_windows, normalize, BoundaryPolicy, CancellationToken, NoisyReconstructor,
    Normalizer, Reconstructor, Scorer, Series,
};

fn generate_series(n: usize) -> Series {
    Series::from_values(
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
            .collect(),
    )
}

fn bench_score_windows(c: &mut Criterion) {
    let reconstructor: Arc<dyn Reconstructor> = Arc::new(NoisyReconstructor::new(0.05, 1));
    let cancel = CancellationToken::new();

    let mut group = c.benchmark_group("ScoreWindows");

    for size in [1_000, 10_000].iter() {
        let series = generate_series(*size);
        let params = Normalizer::default().fit(&series).unwrap();
        let normalized = normalize(&series, &params);
        let windows = make_windows(&normalized, 64).unwrap();

        // Sequential
        group.bench_with_input(BenchmarkId::new("sequential", size), &windows, |b, windows| {
            let scorer = Scorer::new(false, None).unwrap();
            b.iter(|| scorer.score_windows(black_box(windows), &reconstructor, &cancel))
        });

        // Parallel
        group.bench_with_input(BenchmarkId::new("parallel", size), &windows, |b, windows| {
            let scorer = Scorer::new(true, None).unwrap();
            b.iter(|| scorer.score_windows(black_box(windows), &reconstructor, &cancel))
        });
    }

    group.finish();
}

fn bench_label_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("LabelPoints");

    for window in [16usize, 288].iter() {
        let n = 10_000;
        let flags: Vec<bool> = (0..n - window + 1).map(|i| i % 7 != 0).collect();
        group.bench_with_input(BenchmarkId::new("clamped", window), &flags, |b, flags| {
            b.iter(|| label_points(black_box(flags), n, *window, BoundaryPolicy::Clamped))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_score_windows, bench_label_points);
criterion_main!(benches);
