//! Benchmark: Pointer picking over a furnished room

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use std::sync::Arc;
use tidyroom_asset::{pick, Camera, Mesh, Model, Pointer, Primitive, Scene, Transform};

fn furnished_room(pieces: usize) -> Scene {
    let mut b = Model::builder();
    let root = b.node("room", Transform::default());
    for i in 0..pieces {
        let x = (i % 10) as f32 - 4.5;
        let z = -((i / 10) as f32);
        let mesh = Mesh::new(None, vec![Primitive::cuboid(Vec3::splat(0.3))]);
        let node = b.mesh_node(
            &format!("piece_{i}"),
            Transform::from_translation(Vec3::new(x, 0.0, z)),
            mesh,
        );
        b.child(root, node);
    }
    b.root(root);

    let mut scene = Scene::new();
    scene.attach("/models/room.glb", Arc::new(b.build("/models/room.glb")));
    scene
}

fn pick_perf_benchmark(c: &mut Criterion) {
    let scene = furnished_room(100);
    let camera = Camera::perspective(Vec3::new(0.0, 2.0, 6.0), Vec3::ZERO, 75.0, 16.0 / 9.0);

    c.bench_function("pick_hit", |b| {
        b.iter(|| black_box(pick(black_box(Pointer::new(0.0, -0.2)), Some(&scene), Some(&camera))))
    });

    c.bench_function("pick_miss", |b| {
        b.iter(|| black_box(pick(black_box(Pointer::new(0.0, 0.95)), Some(&scene), Some(&camera))))
    });
}

criterion_group!(benches, pick_perf_benchmark);
criterion_main!(benches);
