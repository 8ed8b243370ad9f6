use criterion::{criterion_group, criterion_main, Criterion, black_box};

use cubeland::biome::{BiomeParams, PaletteParams};
use cubeland::engine::{EngineConfig, TerrainEngine};
use cubeland::field::{FieldParams, ScalarField};
use cubeland::mesh::{InstanceBuffers, MeshContext, build_chunk_mesh};
use cubeland::streaming::level_for_distance;

use glam::Vec3;

fn bench_level_for_distance(c: &mut Criterion) {
    c.bench_function("level_for_distance", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for dist in 0..1024u32 {
                acc = acc.wrapping_add(level_for_distance(black_box(dist), 64));
            }
            acc
        });
    });
}

fn bench_elevation_sampling(c: &mut Criterion) {
    let field = ScalarField::new(FieldParams::default());

    c.bench_function("elevation_64x64", |b| {
        b.iter(|| {
            let mut acc = 0.0f64;
            for i in 0..64i64 {
                for j in 0..64i64 {
                    acc += field.elevation(black_box(i as f64), black_box(j as f64));
                }
            }
            acc
        });
    });
}

fn bench_streaming_pass(c: &mut Criterion) {
    c.bench_function("streaming_pass_radius_3", |b| {
        let config = EngineConfig {
            chunk_size: 32,
            window_radius: 3,
            ..Default::default()
        };
        let mut engine = TerrainEngine::new(config).unwrap();
        let mut step = 0u32;
        b.iter(|| {
            // Hop a full chunk each iteration so no tick early-exits.
            step += 1;
            engine.tick(black_box(Vec3::new(step as f32 * 32.0, 200.0, 0.0)))
        });
    });
}

fn bench_flatten(c: &mut Criterion) {
    let config = EngineConfig {
        chunk_size: 32,
        window_radius: 4,
        ..Default::default()
    };
    let mut engine = TerrainEngine::new(config).unwrap();
    engine.tick(Vec3::ZERO);

    c.bench_function("flatten_instance_buffers", |b| {
        b.iter(|| InstanceBuffers::flatten(black_box(engine.store())));
    });
}

fn bench_chunk_mesh(c: &mut Criterion) {
    let ctx = MeshContext::new(
        64,
        -100.0,
        FieldParams::default(),
        BiomeParams::default(),
        PaletteParams::default(),
    );

    c.bench_function("chunk_mesh_level_4", |b| {
        b.iter(|| build_chunk_mesh(black_box(3), black_box(-2), black_box(4), &ctx));
    });
}

criterion_group!(
    benches,
    bench_level_for_distance,
    bench_elevation_sampling,
    bench_streaming_pass,
    bench_flatten,
    bench_chunk_mesh,
);
criterion_main!(benches);
