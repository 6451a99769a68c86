//! Solver throughput across point counts and batch sizes.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nn_registry::Vec3;
use nn_solver::solve_batched;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn cloud(count: usize) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            )
        })
        .collect()
}

fn solve_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");

    for count in [100_u64, 1_000, 4_000] {
        let positions = cloud(count as usize);
        group.throughput(Throughput::Elements(count * count));

        for batch_size in [1, 64, 512] {
            group.bench_with_input(
                BenchmarkId::new(format!("batch_{batch_size}"), count),
                &positions,
                |b, positions| {
                    b.iter(|| black_box(solve_batched(positions, batch_size)));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, solve_benchmarks);

criterion_main!(benches);
