//! Criterion benchmarks for the flow-shop solver.
//!
//! Uses seeded synthetic instances shaped like the generator's output:
//! processing times in 5..=15, off-diagonal setups in 5..=10.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_flowshop::random::{create_rng, random_permutation};
use u_flowshop::{AdaptiveConfig, AnnealConfig, AnnealRunner, MakespanEvaluator, NehRunner, ProblemInstance};

fn synthetic(jobs: usize, machines: usize, seed: u64) -> ProblemInstance {
    let mut rng = create_rng(seed);
    let processing: Vec<Vec<u64>> = (0..jobs)
        .map(|_| (0..machines).map(|_| rng.random_range(5..=15)).collect())
        .collect();
    let setup: Vec<Vec<Vec<u64>>> = (0..machines)
        .map(|_| {
            (0..jobs)
                .map(|i| {
                    (0..jobs)
                        .map(|j| if i == j { 0 } else { rng.random_range(5..=10) })
                        .collect()
                })
                .collect()
        })
        .collect();
    ProblemInstance::new(jobs, machines, processing, setup).unwrap()
}

// ===========================================================================
// Evaluator
// ===========================================================================

fn bench_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    for &(jobs, machines) in &[(20, 5), (100, 10), (500, 20)] {
        let inst = synthetic(jobs, machines, 1);
        let perm = random_permutation(jobs, &mut create_rng(2));
        let mut evaluator = MakespanEvaluator::new(&inst);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{jobs}x{machines}")),
            &perm,
            |b, perm| b.iter(|| evaluator.makespan(black_box(perm))),
        );
    }
    group.finish();
}

// ===========================================================================
// NEH
// ===========================================================================

fn bench_neh(c: &mut Criterion) {
    let mut group = c.benchmark_group("neh");
    group.sample_size(10);
    for &(jobs, machines) in &[(20, 5), (50, 10)] {
        let inst = synthetic(jobs, machines, 3);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{jobs}x{machines}")),
            &inst,
            |b, inst| b.iter(|| NehRunner::run(black_box(inst))),
        );
    }
    group.finish();
}

// ===========================================================================
// Annealing
// ===========================================================================

fn bench_annealing(c: &mut Criterion) {
    let inst = synthetic(50, 5, 4);
    let neh = NehRunner::run(&inst);
    let mut group = c.benchmark_group("annealing");
    group.sample_size(10);

    let standard = AnnealConfig::default().with_iterations(5_000).with_seed(1);
    group.bench_function("standard_5k", |b| {
        b.iter(|| AnnealRunner::run(&inst, Some(&neh.schedule), black_box(&standard)).unwrap())
    });

    let adaptive = AdaptiveConfig::default().with_iterations(5_000).with_seed(1);
    group.bench_function("adaptive_5k", |b| {
        b.iter(|| AnnealRunner::run_adaptive(&inst, Some(&neh.schedule), black_box(&adaptive)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_evaluator, bench_neh, bench_annealing);
criterion_main!(benches);
