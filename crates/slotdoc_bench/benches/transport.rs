//! Placement, reconstruction and decode cache benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slotdoc_bench::role_document;
use slotdoc_core::{normalize, DecodeCache, PlacementMeta, Transport, TransportConfig};

/// Benchmark placement of documents that need one and two slots.
fn bench_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("place");
    let transport = Transport::new(TransportConfig::default());
    let meta = PlacementMeta::new("Bench", 1_700_000_000_000);

    for count in [20, 150] {
        let document = normalize(&role_document(count)).unwrap();
        let segments = transport
            .place_document(document.clone(), &meta)
            .map(|p| p.segments())
            .unwrap_or(0);

        group.bench_with_input(
            BenchmarkId::new(format!("{segments}_segment"), count),
            &document,
            |b, doc| {
                b.iter(|| black_box(transport.place_document(doc.clone(), &meta)));
            },
        );
    }

    group.finish();
}

/// Benchmark reconstruction with and without the decode cache.
fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct");
    let transport = Transport::new(TransportConfig::default());
    let placement = transport
        .place(&role_document(100), &PlacementMeta::new("Bench", 1))
        .unwrap();

    group.bench_function("uncached", |b| {
        b.iter(|| {
            black_box(
                transport
                    .reconstruct(&placement.primary, placement.secondary.as_ref())
                    .unwrap(),
            )
        });
    });

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let cache = DecodeCache::with_gzip("bench");
    let encoded = placement.compressed.encoded_text.clone();
    runtime.block_on(cache.get_or_decode(&encoded)).unwrap();

    group.bench_function("cache_hit", |b| {
        b.iter(|| black_box(runtime.block_on(cache.get_or_decode(black_box(&encoded))).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_place, bench_reconstruct);
criterion_main!(benches);
