use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use toytrace::{
    Camera, Mesh, RenderSettings, Renderer, SceneGraph, Shading,
    geometry::{WorldPoint, WorldVector},
};

fn criterion_benchmark(c: &mut Criterion) {
    let mut scene = SceneGraph::new();

    let camera_node = scene.create_node("camera");
    scene
        .node_mut(camera_node)
        .unwrap()
        .set_position(WorldPoint::new(0.0, 0.0, -4.0));
    scene.attach_node(scene.root(), camera_node).unwrap();
    let camera = scene.add_object(
        Camera::builder()
            .viewport_width(4.0 / 3.0)
            .viewport_height(1.0)
            .build(),
    );
    scene.attach_object(camera_node, camera).unwrap();

    let cube_node = scene.create_node("cube");
    scene
        .node_mut(cube_node)
        .unwrap()
        .rotate_y(0.6)
        .rotate_x(0.4)
        .scale(WorldVector::new(1.0, 1.5, 1.0));
    scene.attach_node(scene.root(), cube_node).unwrap();
    let cube = scene.add_object(Mesh::cube(1.0));
    scene.attach_object(cube_node, cube).unwrap();

    scene.update();

    let settings = RenderSettings {
        sample_count: 4.try_into().unwrap(),
        shading: Shading::Diffuse,
        ..Default::default()
    };
    let mut renderer = Renderer::with_settings(&mut scene, 320, 240, settings);
    renderer.set_camera(Some(camera));
    let mut buffer = vec![0u8; renderer.buffer_len()];

    c.bench_function("render_cube", |b| {
        b.iter(|| renderer.render(&scene, &mut buffer).unwrap())
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(20));
    targets = criterion_benchmark
}
criterion_main!(benches);
