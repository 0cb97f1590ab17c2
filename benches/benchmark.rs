// Retrieval benchmarks: exact vs HNSW search, query embedding, concurrent readers
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hotelrag::{Distance, Embedder, FlatIndex, HashingEmbedder, HnswIndex, HnswParams, Vector, VectorIndex};
use rand::prelude::*;
use std::sync::Arc;
use std::thread;

const DIM: usize = 384;

fn generate_random_vector(dim: usize) -> Vector {
    let mut rng = rand::rng();
    let data: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    Vector::new(data)
}

fn generate_vectors(count: usize, dim: usize) -> Vec<Vector> {
    (0..count).map(|_| generate_random_vector(dim)).collect()
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for size in [1000, 10000].iter() {
        let vectors = generate_vectors(*size, DIM);
        group.bench_with_input(BenchmarkId::new("flat", size), &vectors, |b, vectors| {
            b.iter(|| FlatIndex::from_vectors(DIM, Distance::Euclidean, vectors).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("hnsw", size), &vectors, |b, vectors| {
            b.iter(|| {
                HnswIndex::build(DIM, Distance::Euclidean, vectors, HnswParams::default()).unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [1000, 10000].iter() {
        let vectors = generate_vectors(*size, DIM);
        let flat = FlatIndex::from_vectors(DIM, Distance::Euclidean, &vectors).unwrap();
        let hnsw =
            HnswIndex::build(DIM, Distance::Euclidean, &vectors, HnswParams::default()).unwrap();
        let query = generate_random_vector(DIM);

        group.bench_with_input(BenchmarkId::new("flat", size), &query, |b, query| {
            b.iter(|| black_box(flat.search(black_box(query), 3).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("hnsw", size), &query, |b, query| {
            b.iter(|| black_box(hnsw.search(black_box(query), 3).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_embed(c: &mut Criterion) {
    let mut group = c.benchmark_group("embed");
    let embedder = HashingEmbedder::default();

    for query in [
        "cheap hotel near downtown",
        "Which bookings were canceled for resort hotels with a lead time over ninety days?",
    ] {
        group.bench_with_input(BenchmarkId::new("hashing", query.len()), query, |b, query| {
            b.iter(|| black_box(embedder.embed(black_box(query)).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_reads");

    let vectors = generate_vectors(10000, DIM);
    let index: Arc<dyn VectorIndex> = Arc::new(
        HnswIndex::build(DIM, Distance::Euclidean, &vectors, HnswParams::default()).unwrap(),
    );
    let query = generate_random_vector(DIM);

    group.bench_function("hnsw_10_threads", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..10)
                .map(|_| {
                    let index = index.clone();
                    let q = query.clone();
                    thread::spawn(move || index.search(&q, 3))
                })
                .collect();

            for handle in handles {
                black_box(handle.join().unwrap().unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_build, benchmark_search, benchmark_embed, benchmark_concurrent_reads);
criterion_main!(benches);
