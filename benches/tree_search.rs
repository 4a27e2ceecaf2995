//! Criterion benchmarks for the tree-search track finder.
//!
//! Run with: cargo bench
//! Run specific group: cargo bench -- per_seed
//! Compare against baseline: cargo bench -- --save-baseline main

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use treekf::{
    search_seeds, Hit, HitCache, LineExtrapolator, Plane, SearchConfig, Seed, SensorId,
    StateArena, TreeSearchEngine,
};

const N_LAYERS: usize = 3;

fn scattered_hits(rng: &mut StdRng, per_layer: usize) -> Vec<Hit> {
    let mut hits = Vec::with_capacity(N_LAYERS * per_layer);
    for layer in 1..=N_LAYERS {
        for _ in 0..per_layer {
            hits.push(Hit::pixel(
                SensorId::new(layer, rng.gen_range(1..=8), 1),
                Plane::at(layer as f64),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                1e-6,
                1e-6,
            ));
        }
    }
    hits
}

fn seed_at_origin() -> Seed {
    Seed::new(
        Plane::at(N_LAYERS as f64 + 1.0),
        DVector::zeros(4),
        DMatrix::identity(4, 4) * 1e-4,
    )
}

fn engine(keep: usize) -> TreeSearchEngine<LineExtrapolator> {
    let config = SearchConfig::builder()
        .terminal_depth(2 * N_LAYERS)
        .ladder_counts(vec![8; N_LAYERS])
        .branch_keep_count(keep)
        .build()
        .unwrap();
    TreeSearchEngine::new(config, LineExtrapolator).unwrap()
}

fn bench_per_seed(c: &mut Criterion) {
    let mut group = c.benchmark_group("per_seed");
    let mut rng = StdRng::seed_from_u64(42);

    for per_layer in [10usize, 50, 200] {
        let hits = scattered_hits(&mut rng, per_layer);
        let cache = HitCache::build(&hits, N_LAYERS);
        let engine = engine(2);
        let seed = seed_at_origin();

        group.bench_with_input(
            BenchmarkId::from_parameter(per_layer),
            &per_layer,
            |b, _| {
                let mut arena = StateArena::new();
                b.iter(|| engine.search(&hits, &cache, &seed, &mut arena));
            },
        );
    }
    group.finish();
}

fn bench_cache_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_build");
    let mut rng = StdRng::seed_from_u64(42);

    for per_layer in [50usize, 500] {
        let hits = scattered_hits(&mut rng, per_layer);
        group.bench_with_input(
            BenchmarkId::from_parameter(per_layer),
            &per_layer,
            |b, _| b.iter(|| HitCache::build(&hits, N_LAYERS)),
        );
    }
    group.finish();
}

fn bench_seed_batch(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let hits = scattered_hits(&mut rng, 50);
    let cache = HitCache::build(&hits, N_LAYERS);
    let engine = engine(2);
    let seeds: Vec<Seed> = (0..32).map(|_| seed_at_origin()).collect();

    c.bench_function("seed_batch_32", |b| {
        b.iter(|| search_seeds(&engine, &hits, &cache, &seeds))
    });
}

criterion_group!(benches, bench_per_seed, bench_cache_build, bench_seed_batch);
criterion_main!(benches);
