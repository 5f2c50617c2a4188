//! Throughput of the memoized walk against an in-memory store.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

use collatz_explorer::adapters::sqlite::{create_test_pool, initialize_database, SqliteSequenceStore};
use collatz_explorer::{reference_steps, SequenceComputer};

fn bench_reference_walk(c: &mut Criterion) {
    c.bench_function("reference_walk_1_to_10000", |b| {
        b.iter(|| (1..10_000u64).map(reference_steps).sum::<u64>());
    });
}

fn bench_memoized_walk(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();

    c.bench_function("memoized_walk_1_to_1000", |b| {
        b.to_async(&runtime).iter_batched(
            || (),
            |()| async {
                let pool = create_test_pool().await.unwrap();
                initialize_database(&pool).await.unwrap();
                let computer =
                    SequenceComputer::new(Arc::new(SqliteSequenceStore::new(pool.clone())));
                let mut total = 0u64;
                for n in 1..1_000u64 {
                    total += computer.compute(n).await.unwrap().steps;
                }
                pool.close().await;
                total
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_reference_walk, bench_memoized_walk);
criterion_main!(benches);
