//! Benchmarks for screw interpolation and the lazy clean walk.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use glam::{Mat4, Vec3};
use helix::{DualQuat, ObjectKey, TransformationType, World};

fn bench_sclerp(c: &mut Criterion) {
    let a = DualQuat::from_translation(Vec3::new(20.0, 0.0, 0.0))
        * DualQuat::from_axis_angle(Vec3::Y, std::f32::consts::PI);
    let b = DualQuat::from_translation(Vec3::new(42.0, 42.0, 42.0))
        * DualQuat::from_axis_angle(Vec3::X, 75.0_f32.to_radians());

    let mut group = c.benchmark_group("sclerp");
    group.bench_function("sclerp", |bench| {
        bench.iter(|| black_box(a).sclerp(black_box(b), black_box(0.3)));
    });
    group.bench_function("sclerp_shortest_path", |bench| {
        bench.iter(|| black_box(a).sclerp_shortest_path(black_box(b), black_box(0.3)));
    });
    group.bench_function("mat4_round_trip", |bench| {
        bench.iter(|| DualQuat::from_mat4(&black_box(a).to_mat4()));
    });
    group.finish();
}

/// A chain of `depth` objects under a scene with an active camera at the leaf.
fn camera_chain(depth: usize) -> (World, ObjectKey, ObjectKey) {
    let mut world = World::new();
    let scene = world.add_scene();
    let mut parent = scene;
    let mut root = scene;
    for i in 0..depth {
        let object = world.add_object(Some(parent));
        world.set_transformation(object, Mat4::from_translation(Vec3::new(0.1, 0.0, 0.0)));
        if i == 0 {
            root = object;
        }
        parent = object;
    }
    let camera = world.add_camera(Some(parent));
    let _ = world.activate_camera(camera, scene);
    (world, root, camera)
}

fn bench_clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_graph");

    for depth in [8, 64] {
        let (mut world, root, camera) = camera_chain(depth);
        group.bench_function(format!("move_root_depth_{depth}"), |bench| {
            bench.iter(|| {
                world.translate(root, Vec3::X * 0.001, TransformationType::Global);
                black_box(world.camera_matrix(camera))
            });
        });
    }

    let (mut world, _, camera) = camera_chain(64);
    group.bench_function("camera_matrix_clean", |bench| {
        bench.iter(|| black_box(world.camera_matrix(black_box(camera))));
    });

    group.finish();
}

criterion_group!(benches, bench_sclerp, bench_clean);
criterion_main!(benches);
