//! Performance benchmarks for matchmaking runs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use matchroom::config::MatchmakingConfig;
use matchroom::engine::{MatchmakingEngine, Pool};
use matchroom::types::Player;

/// Spread players over a wide rating range with a few long waiters
fn create_bench_pool(size: usize) -> Pool {
    let players = (0..size)
        .map(|i| {
            Player::new(
                format!("player_{}", i),
                800.0 + ((i * 7919) % 2000) as f64,
                (i % 5) as u32,
            )
        })
        .collect();
    Pool::new(players).unwrap()
}

fn bench_engine_runs(c: &mut Criterion) {
    let engine = MatchmakingEngine::new(MatchmakingConfig::default()).unwrap();
    let mut group = c.benchmark_group("engine_run");

    for size in [50, 500, 5000] {
        let pool = create_bench_pool(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &pool, |b, pool| {
            b.iter(|| black_box(engine.run(pool)))
        });
    }

    group.finish();
}

fn bench_sparse_pool_widening(c: &mut Criterion) {
    // Players 150 apart force every seed through the whole window schedule
    let players = (0..300)
        .map(|i| Player::new(format!("sparse_{}", i), i as f64 * 150.0, 0))
        .collect();
    let pool = Pool::new(players).unwrap();
    let engine = MatchmakingEngine::new(MatchmakingConfig::default()).unwrap();

    c.bench_function("sparse_pool_widening", |b| {
        b.iter(|| black_box(engine.run(&pool)))
    });
}

fn bench_manifest_serialization(c: &mut Criterion) {
    let engine = MatchmakingEngine::new(MatchmakingConfig::default()).unwrap();
    let manifest = engine.run(&create_bench_pool(1000)).manifest;

    c.bench_function("manifest_to_json_1000", |b| {
        b.iter(|| black_box(manifest.to_json()))
    });
}

criterion_group!(
    benches,
    bench_engine_runs,
    bench_sparse_pool_widening,
    bench_manifest_serialization
);
criterion_main!(benches);
