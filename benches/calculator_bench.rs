//! Benchmarks for dosage derivation and document encoding
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dosage_converter::*;

fn create_test_document(count: usize) -> PersistedDocument {
    let history = (0..count)
        .map(|i| {
            HistoryEntry::new(200.0, 200.0, i as f64, i as f64).timestamp(i as i64 * 1000)
        })
        .collect();
    PersistedDocument::new(InputState::new("200", "200", "10"), history)
}

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");

    let input = InputState::new("200", "200", "10");
    group.bench_function("compute_result", |b| {
        b.iter(|| compute_result(black_box(&input)))
    });

    let input = InputState::new("  2.5e1ml", "1000", "16.75");
    group.bench_function("compute_result_lenient", |b| {
        b.iter(|| compute_result(black_box(&input)))
    });

    group.finish();
}

fn bench_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");

    for size in [10, 100, 1000] {
        let doc = create_test_document(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("encode_{}", size), |b| {
            b.iter(|| black_box(&doc).to_json().unwrap())
        });

        let json = doc.to_json().unwrap();

        group.bench_function(format!("decode_{}", size), |b| {
            b.iter(|| PersistedDocument::from_json(black_box(&json)).unwrap())
        });
    }

    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    group.bench_function("set_and_commit", |b| {
        let mut store = DosageStore::open(MemoryStore::new());
        store.set_standard_amount("200");
        store.set_standard_volume("200");

        b.iter(|| {
            store.set_target_volume(black_box("10"));
            store.add_to_history();
            if store.history().len() > 100 {
                store.clear_history();
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_compute, bench_document, bench_store);
criterion_main!(benches);
