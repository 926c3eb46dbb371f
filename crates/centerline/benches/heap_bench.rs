//! Criterion benchmarks for the indexed min-heap.
//! Focus sizes: n in {1k, 10k, 100k}.
//! Results under target/criterion.

use centerline::heap::MinHeap;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_values(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0.0..100.0)).collect()
}

fn bench_heap(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap");
    for &n in &[1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("insert_then_drain", n), &n, |b, &n| {
            b.iter_batched(
                || random_values(n, 7),
                |values| {
                    let mut heap = MinHeap::new();
                    heap.initialize(n);
                    for id in 0..n {
                        heap.insert(id, &values).unwrap();
                    }
                    while let Some(_id) = heap.pop_min(&values).unwrap() {}
                },
                BatchSize::LargeInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("decrease_keys", n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let values = random_values(n, 8);
                    let mut heap = MinHeap::new();
                    heap.initialize(n);
                    for id in 0..n {
                        heap.insert(id, &values).unwrap();
                    }
                    (heap, values)
                },
                |(mut heap, mut values)| {
                    for id in (0..n).step_by(3) {
                        values[id] *= 0.5;
                        heap.update(id, &values).unwrap();
                    }
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_heap);
criterion_main!(benches);
