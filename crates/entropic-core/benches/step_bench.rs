//! Step-loop benchmarks.

use criterion::{criterion_group, criterion_main, Criterion};
use entropic_core::grid::{Face, GridPos};
use entropic_core::test_utils::*;

fn bench_production_line(c: &mut Criterion) {
    c.bench_function("production_line_100_steps", |b| {
        b.iter_batched(
            production_line_world,
            |mut world| {
                world.run(100);
                world
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_wide_grid(c: &mut Criterion) {
    c.bench_function("grid_of_generators_100_steps", |b| {
        b.iter_batched(
            || {
                let mut world = basic_world();
                for x in 0..10 {
                    for z in 0..10 {
                        place_generator_with_fuel(&mut world, GridPos::new(x * 2, 0, z * 2), 4);
                    }
                }
                let _ = world.add_device(GridPos::new(1, 0, 1), Face::North, type_id(&world, "cell"));
                world
            },
            |mut world| {
                world.run(100);
                world
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_production_line, bench_wide_grid);
criterion_main!(benches);
