//! Benchmarks for neighbor search and cross-validation

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stkfold_algorithms::interpolation::{BruteForceIndex, KdTree, NeighborIndex};
use stkfold_algorithms::evaluate;
use stkfold_core::{CvConfig, Point, ScaledPoint};

fn create_scaled(n: usize) -> Vec<ScaledPoint> {
    (0..n)
        .map(|i| {
            let x = ((i * 7919) % 1000) as f64 * 0.05;
            let y = ((i * 104_729) % 1000) as f64 * 0.025;
            let day = (i % 365 + 1) as f64;
            ScaledPoint { ordinal: i, x, y, t: 0.05 * day, day, value: 1.0 + (i % 40) as f64 }
        })
        .collect()
}

fn create_points(n: usize) -> Vec<Point> {
    let d0 = NaiveDate::from_ymd_opt(2009, 1, 1).unwrap();
    create_scaled(n)
        .into_iter()
        .map(|p| {
            let date = d0 + chrono::Duration::days(p.day as i64 - 1);
            Point::new("s", p.x, p.y, date, p.value)
        })
        .collect()
}

fn bench_knn(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbors/k_nearest_5");
    for size in [1_000, 10_000, 40_000] {
        let pts = create_scaled(size);
        let tree = KdTree::build(&pts).unwrap();
        let queries: Vec<ScaledPoint> = pts.iter().step_by(size / 100).copied().collect();
        group.bench_with_input(BenchmarkId::new("kdtree", size), &size, |b, _| {
            b.iter(|| {
                for q in &queries {
                    black_box(tree.k_nearest(q, 5).unwrap());
                }
            })
        });
        if size <= 10_000 {
            let oracle = BruteForceIndex::build(&pts).unwrap();
            group.bench_with_input(BenchmarkId::new("brute_force", size), &size, |b, _| {
                b.iter(|| {
                    for q in &queries {
                        black_box(oracle.k_nearest(q, 5).unwrap());
                    }
                })
            });
        }
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbors/build");
    for size in [1_000, 10_000, 40_000] {
        let pts = create_scaled(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| KdTree::build(black_box(&pts)).unwrap())
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation/evaluate");
    group.sample_size(20);
    for size in [1_000, 5_000] {
        let pts = create_points(size);
        let config = CvConfig::new(10, 5, 2.0, 0.05);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| evaluate(black_box(&config), &pts, None).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_knn, bench_build, bench_evaluate);
criterion_main!(benches);
