//! Criterion benchmarks for the generation hot paths.
//!
//! Benchmarks:
//! 1. Seed hashing and raw Mulberry32 output
//! 2. Sampling primitives (unique integers, weighted pool)
//! 3. Each strategy against a 500-contest history, direct and cached

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use dezena_core::rng::{hash_seed, Mulberry32, SeedHierarchy};
use dezena_core::sampling::{sample_unique_integers, WeightedPool};
use dezena_core::statistics::{Draw, DrawHistory, StatisticsCache};
use dezena_core::strategies::{StrategyContext, StrategyKind};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_history(n: u32) -> DrawHistory {
    let draws = (1..=n)
        .map(|contest| {
            let mut rng = Mulberry32::new(contest);
            let numbers = sample_unique_integers(&mut rng, 1, 60, 6)
                .unwrap()
                .into_iter()
                .map(|v| v as u8)
                .collect();
            Draw::new(contest, numbers)
        })
        .collect();
    DrawHistory::new(draws).unwrap()
}

// ── 1. RNG ───────────────────────────────────────────────────────────

fn bench_rng(c: &mut Criterion) {
    let mut group = c.benchmark_group("rng");

    group.bench_function("hash_seed_sub_seed", |b| {
        let seeds = SeedHierarchy::new("bench-master");
        b.iter(|| {
            for i in 0..100 {
                black_box(hash_seed(&seeds.sub_seed("hot-streak", i)));
            }
        });
    });

    group.bench_function("next_f64_10k", |b| {
        b.iter(|| {
            let mut rng = Mulberry32::new(42);
            let mut acc = 0.0;
            for _ in 0..10_000 {
                acc += rng.next_f64();
            }
            black_box(acc)
        });
    });

    group.finish();
}

// ── 2. Sampling ──────────────────────────────────────────────────────

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling");

    for &k in &[6usize, 10, 15] {
        group.bench_with_input(BenchmarkId::new("unique_integers", k), &k, |b, &k| {
            b.iter(|| {
                let mut rng = Mulberry32::new(7);
                black_box(sample_unique_integers(&mut rng, 1, 60, k).unwrap())
            });
        });
    }

    group.bench_function("weighted_pool_15_of_60", |b| {
        b.iter(|| {
            let mut rng = Mulberry32::new(11);
            let mut pool = WeightedPool::from_pairs((1u8..=60).map(|n| (n, f64::from(n))));
            black_box(pool.draw_without_replacement(&mut rng, 15))
        });
    });

    group.finish();
}

// ── 3. Strategies ────────────────────────────────────────────────────

fn bench_strategies(c: &mut Criterion) {
    let history = make_history(500);
    let cached = StatisticsCache::new(make_history(500));
    let mut group = c.benchmark_group("strategies");

    for kind in StrategyKind::ALL {
        group.bench_with_input(BenchmarkId::new("direct", kind), &kind, |b, &kind| {
            let mut i = 0u64;
            b.iter(|| {
                i += 1;
                let seed = format!("bench:{i}");
                let ctx = StrategyContext::new(&seed, 10).with_statistics(&history);
                black_box(kind.generate(&ctx).unwrap())
            });
        });

        group.bench_with_input(BenchmarkId::new("cached", kind), &kind, |b, &kind| {
            let mut i = 0u64;
            b.iter(|| {
                i += 1;
                let seed = format!("bench:{i}");
                let ctx = StrategyContext::new(&seed, 10).with_statistics(&cached);
                black_box(kind.generate(&ctx).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rng, bench_sampling, bench_strategies);
criterion_main!(benches);
