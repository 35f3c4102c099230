//! Throughput Benchmark for SnapKV
//!
//! Every create rewrites the full snapshot, so write cost grows with store
//! size. These benchmarks make that visible next to the cost of reads,
//! which never touch the disk.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use snapkv::storage::StorageEngine;
use snapkv::Limits;
use tempfile::TempDir;

/// Opens an engine pre-populated with `keys` entries.
fn populated(dir: &TempDir, keys: usize) -> StorageEngine {
    let engine = StorageEngine::open(dir.path().join("bench.json"), Limits::default()).unwrap();
    for chunk in (0..keys).collect::<Vec<_>>().chunks(100) {
        let batch = chunk
            .iter()
            .map(|i| (format!("seed:{}", i), json!({"id": i, "name": "seed"})))
            .collect();
        engine.batch_create(batch, 0).unwrap();
    }
    engine
}

/// Benchmark create against store size
fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");
    group.throughput(Throughput::Elements(1));
    group.sample_size(20);

    for size in [0usize, 1_000, 10_000] {
        let dir = TempDir::new().unwrap();
        let engine = populated(&dir, size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut i = 0u64;
            b.iter(|| {
                engine
                    .create(&format!("key:{}", i), json!({"n": i}), 0)
                    .unwrap();
                i += 1;
            });
        });
    }

    group.finish();
}

/// Benchmark batch create of a full batch
fn bench_batch_create(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let engine = populated(&dir, 1_000);

    let mut group = c.benchmark_group("batch_create");
    group.throughput(Throughput::Elements(100));
    group.sample_size(20);

    group.bench_function("batch_100", |b| {
        let mut round = 0u64;
        b.iter(|| {
            let batch = (0..100)
                .map(|i| (format!("b{}:{}", round, i), json!(i)))
                .collect();
            engine.batch_create(batch, 0).unwrap();
            round += 1;
        });
    });

    group.finish();
}

/// Benchmark read operations
fn bench_read(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let engine = populated(&dir, 10_000);

    let mut group = c.benchmark_group("read");
    group.throughput(Throughput::Elements(1));

    group.bench_function("read_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(engine.read(&format!("seed:{}", i % 10_000)).ok());
            i += 1;
        });
    });

    group.bench_function("read_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(engine.read(&format!("missing:{}", i)).ok());
            i += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_create, bench_batch_create, bench_read);
criterion_main!(benches);
