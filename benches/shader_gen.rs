//! Benchmarks for shader generation and the CPU mirror kernel.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use shoal::kernel;
use shoal::prelude::*;

fn bench_shader_gen(c: &mut Criterion) {
    let mut group = c.benchmark_group("shader_gen");

    group.bench_function("velocity_box", |b| {
        let boundary = Boundary::Box { extents: Vec3::new(50.0, 30.0, 50.0) };
        b.iter(|| black_box(kernel::velocity_shader(&boundary)))
    });

    group.bench_function("velocity_shell", |b| {
        let boundary = Boundary::Shell { inner: 0.5, outer: 2.0 };
        b.iter(|| black_box(kernel::velocity_shader(&boundary)))
    });

    group.bench_function("position", |b| {
        b.iter(|| black_box(kernel::position_shader()))
    });

    group.finish();
}

fn bench_cpu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_step");

    for count in [64u32, 256, 1024] {
        group.bench_with_input(BenchmarkId::new("particles", count), &count, |b, &count| {
            let mut config = SimulationConfig::aquarium();
            config.particle_count = count;
            config.spawn = SpawnVolume::Bounds;
            let groups = GroupAssignment::generate(count, config.group_count, config.seed);
            let mut flock = CpuFlock::new(&config, &groups);

            let mut elapsed = 0.0;
            b.iter(|| {
                elapsed += 0.016;
                flock.step(0.016, elapsed);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shader_gen, bench_cpu_step);
criterion_main!(benches);
