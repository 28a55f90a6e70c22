//! Integration tests for what scene trees mean, checked on the CPU

// Tests are allowed to use expect/unwrap for cleaner error messages
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use sdfc_math::hyperbolic::{ORIGIN, translation_x, translation_z};
use sdfc_scene::glam::{Mat4, Vec3, Vec4};
use sdfc_scene::{CpuScene, Node, NodeId, SceneBuilder, SceneConfig, tiling};

const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

fn point(x: f32, y: f32, z: f32) -> Vec4 {
    Vec4::new(x, y, z, 1.0)
}

fn assert_vec_eq(actual: Vec4, expected: Vec4) {
    assert!(
        actual.abs_diff_eq(expected, 1e-5),
        "expected {expected}, got {actual}"
    );
}

fn red_blue_blend(scene: &mut SceneBuilder, k: f32) -> NodeId {
    let red = scene.add(Node::sphere(1.0_f32, Vec3::new(-1.0, 0.0, 0.0), RED));
    let blue = scene.add(Node::sphere(1.0_f32, Vec3::new(1.0, 0.0, 0.0), BLUE));
    scene.add(Node::smooth_union(k, [red, blue]))
}

#[test]
fn smooth_union_with_small_k_keeps_nearest_albedo() {
    let mut scene = SceneBuilder::default();
    let blend = red_blue_blend(&mut scene, 0.01);
    let cpu = CpuScene::new(&scene);

    let hit = cpu.hit(blend, point(-0.5, 0.0, 0.0)).unwrap();
    assert_vec_eq(hit.albedo, RED);
    assert_relative_eq!(hit.dist, -0.5, epsilon = 1e-3);
}

#[test]
fn smooth_union_with_large_k_mixes_albedo() {
    let mut scene = SceneBuilder::default();
    let blend = red_blue_blend(&mut scene, 100.0);
    let cpu = CpuScene::new(&scene);

    // d1 = -0.5, d2 = 0.5, so h = 0.5 + 0.5 * 1 / 100
    let hit = cpu.hit(blend, point(-0.5, 0.0, 0.0)).unwrap();
    let h = 0.505;
    assert_vec_eq(hit.albedo, BLUE.lerp(RED, h));

    // Halfway between the spheres both contribute equally
    let middle = cpu.hit(blend, point(0.0, 0.0, 0.0)).unwrap();
    assert_vec_eq(middle.albedo, Vec4::new(0.5, 0.0, 0.5, 1.0));
}

#[test]
fn smooth_union_distance_never_exceeds_union() {
    let mut scene = SceneBuilder::default();
    let blend = red_blue_blend(&mut scene, 0.5);
    let red = scene.add(Node::sphere(1.0_f32, Vec3::new(-1.0, 0.0, 0.0), RED));
    let blue = scene.add(Node::sphere(1.0_f32, Vec3::new(1.0, 0.0, 0.0), BLUE));
    let hard = scene.add(Node::union([red, blue]));
    let cpu = CpuScene::new(&scene);

    for x in [-2.5_f32, -1.0, 0.0, 0.7, 3.0] {
        let p = point(x, 0.8, 0.0);
        assert!(cpu.distance(blend, p).unwrap() <= cpu.distance(hard, p).unwrap() + 1e-6);
    }
}

#[test]
fn nested_transforms_match_combined_transform() {
    let mut scene = SceneBuilder::default();
    let rotation = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
    let translation = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));

    // Rotate first, then translate
    let ball = scene.add(Node::sphere(0.25_f32, Vec3::X, RED));
    let rotated = scene.transform(rotation, ball).unwrap();
    let nested = scene.transform(translation, rotated).unwrap();

    let twin = scene.add(Node::sphere(0.25_f32, Vec3::X, RED));
    let combined = scene.transform(translation * rotation, twin).unwrap();

    let cpu = CpuScene::new(&scene);
    // The sphere's center ends up at (2, 1, 0)
    let p = point(2.0, 1.5, 0.0);

    let a = cpu.hit(nested, p).unwrap();
    let b = cpu.hit(combined, p).unwrap();
    assert_relative_eq!(a.dist, 0.25, epsilon = 1e-5);
    assert_relative_eq!(a.dist, b.dist, epsilon = 1e-5);
    assert_vec_eq(a.position, p);
    assert_vec_eq(b.position, p);
    assert_vec_eq(a.normal, Vec4::Y);
    assert_vec_eq(a.normal, b.normal);
}

#[test]
fn intersection_and_invert_carve() {
    let mut scene = SceneBuilder::default();
    let outer = scene.add(Node::sphere(1.0_f32, Vec3::ZERO, RED));
    let inner = scene.add(Node::sphere(0.5_f32, Vec3::ZERO, BLUE));
    let hole = scene.add(Node::invert(inner));
    let shell = scene.add(Node::intersection([outer, hole]));
    let cpu = CpuScene::new(&scene);

    assert!(cpu.distance(shell, point(0.0, 0.0, 0.0)).unwrap() > 0.0);
    assert!(cpu.distance(shell, point(0.75, 0.0, 0.0)).unwrap() < 0.0);
    assert!(cpu.distance(shell, point(1.5, 0.0, 0.0)).unwrap() > 0.0);

    // Near the cavity the inverted surface wins, normal pointing inward
    let hit = cpu.hit(shell, point(0.55, 0.0, 0.0)).unwrap();
    assert_vec_eq(hit.albedo, BLUE);
    assert_vec_eq(hit.normal, Vec4::new(-1.0, 0.0, 0.0, 0.0));
}

#[test]
fn mix_match_splits_distance_and_shading() {
    let mut scene = SceneBuilder::default();
    let shape = scene.add(Node::sphere(1.0_f32, Vec3::ZERO, RED));
    let paint = scene.add(Node::constant(0.0_f32, Vec3::Y, BLUE));
    let mixed = scene.add(Node::mix_match(shape, paint));
    let cpu = CpuScene::new(&scene);

    let p = point(0.0, 2.0, 0.0);
    assert_relative_eq!(cpu.distance(mixed, p).unwrap(), 1.0);
    assert_vec_eq(cpu.hit(mixed, p).unwrap().albedo, BLUE);
}

#[test]
fn hyperbolic_sphere_and_plane_distances() {
    let mut scene = SceneBuilder::new(SceneConfig::hyperbolic());
    let ball = scene.add(Node::sphere_h(0.5_f32, ORIGIN, RED));
    let wall = scene.add(Node::plane_h(Vec4::X, 0.0_f32, BLUE));
    let cpu = CpuScene::new(&scene);

    let p = translation_x(1.5) * ORIGIN;
    assert_relative_eq!(cpu.distance(ball, p).unwrap(), 1.0, epsilon = 1e-4);
    assert_relative_eq!(cpu.distance(wall, p).unwrap(), 1.5, epsilon = 1e-4);

    // Translating the scene keeps geodesic distances
    let moved = scene.transform_h(translation_z(3.0), ball).unwrap();
    let cpu = CpuScene::new(&scene);
    let q = translation_z(3.0) * translation_x(1.5) * ORIGIN;
    assert_relative_eq!(cpu.distance(moved, q).unwrap(), 1.0, epsilon = 1e-3);
}

#[test]
fn hyperbolic_floor_builds() {
    let mut scene = SceneBuilder::new(SceneConfig::hyperbolic());
    scene.define_camera_transform::<Mat4>("camTransform").unwrap();
    let floor = tiling::tiling_prisms(&mut scene, 5, 4, 1, 0.1, 0.05, BLUE, 0.01).unwrap();
    scene.set_root(floor);

    let cpu = CpuScene::new(&scene);
    // Just under the central cell's top face
    let p = sdfc_math::hyperbolic::translation_y(-0.05) * ORIGIN;
    assert!(cpu.distance(floor, p).unwrap() < 0.0);

    let source = scene.build_source().unwrap();
    assert!(source.contains("TransformPointH("));
    assert_eq!(source.matches("float PlaneHSdf(").count(), 1);
}
