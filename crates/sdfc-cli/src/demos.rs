//! Built-in demo scenes

use std::f32::consts::PI;
use std::time::Instant;

use sdfc_math::hyperbolic::{self, ORIGIN};
use sdfc_scene::glam::{Mat4, Vec3, Vec4};
use sdfc_scene::{Node, NodeId, Result, SceneBuilder, SceneConfig, Space, tiling};

const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
const GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);
const WHITE: Vec4 = Vec4::ONE;
const GRAY: Vec4 = Vec4::new(0.5, 0.5, 0.5, 1.0);

/// A named scene the CLI can build
pub struct Demo {
    pub name: &'static str,
    pub description: &'static str,
    pub space: Space,
    build: fn(&mut SceneBuilder) -> Result<NodeId>,
}

impl Demo {
    /// Scene with camera, per-frame writers and root in place
    pub fn instantiate(&self, config: SceneConfig) -> Result<SceneBuilder> {
        let mut scene = SceneBuilder::new(config);
        scene.define_camera_transform::<Mat4>("camTransform")?;

        let camera = match self.space {
            Space::Euclidean => Mat4::from_translation(Vec3::new(0.0, 1.0, -5.0)),
            Space::Hyperbolic => hyperbolic::translation_y(0.5),
        };
        scene.on_frame("camera", move |sink| sink.write_value("camTransform", &camera));

        let root = (self.build)(&mut scene)?;
        scene.set_root(root);
        tracing::debug!(demo = self.name, nodes = scene.nodes().len(), "Instantiated demo");
        Ok(scene)
    }
}

pub static DEMOS: &[Demo] = &[
    Demo {
        name: "sphere",
        description: "A single red sphere",
        space: Space::Euclidean,
        build: sphere,
    },
    Demo {
        name: "smooth-union",
        description: "A sphere blending into a smaller one sliding along z",
        space: Space::Euclidean,
        build: smooth_union,
    },
    Demo {
        name: "intersection",
        description: "The lens where two spheres overlap, one of them moving",
        space: Space::Euclidean,
        build: intersection,
    },
    Demo {
        name: "carved",
        description: "A hemisphere hollowed out by moving blobs",
        space: Space::Euclidean,
        build: carved,
    },
    Demo {
        name: "spinning",
        description: "An off-center sphere orbiting the y axis",
        space: Space::Euclidean,
        build: spinning,
    },
    Demo {
        name: "hyperbolic-spheres",
        description: "Two small spheres above a hyperbolic disc",
        space: Space::Hyperbolic,
        build: hyperbolic_spheres,
    },
    Demo {
        name: "hyperbolic-tiling-spheres",
        description: "One sphere per cell of a {4, 5} tiling",
        space: Space::Hyperbolic,
        build: hyperbolic_tiling_spheres,
    },
    Demo {
        name: "hyperbolic-room",
        description: "A 12-sided room with right-angled corners",
        space: Space::Hyperbolic,
        build: hyperbolic_room,
    },
    Demo {
        name: "hyperbolic-floor-45",
        description: "A floor of squares, five around each corner",
        space: Space::Hyperbolic,
        build: |scene| hyperbolic_floor(scene, 4, 5),
    },
    Demo {
        name: "hyperbolic-floor-54",
        description: "A floor of pentagons, four around each corner",
        space: Space::Hyperbolic,
        build: |scene| hyperbolic_floor(scene, 5, 4),
    },
];

pub fn find(name: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|demo| demo.name == name)
}

/// Seconds since the scene was built
fn clock() -> impl Fn() -> f32 + Send + Sync + Clone + 'static {
    let start = Instant::now();
    move || start.elapsed().as_secs_f32()
}

// ===== Euclidean =====

fn sphere(scene: &mut SceneBuilder) -> Result<NodeId> {
    Ok(scene.add(Node::sphere(1.0_f32, Vec3::ZERO, RED)))
}

fn smooth_union(scene: &mut SceneBuilder) -> Result<NodeId> {
    let time = clock();
    let center = scene.dynamic(move || Vec3::new(0.0, 0.0, 2.0 * time().sin()))?;

    let still = scene.add(Node::sphere(1.0_f32, Vec3::ZERO, RED));
    let moving = scene.add(Node::sphere(0.5_f32, center, GREEN));
    Ok(scene.add(Node::smooth_union(0.5_f32, [still, moving])))
}

fn intersection(scene: &mut SceneBuilder) -> Result<NodeId> {
    let time = clock();
    let center = scene.dynamic(move || Vec3::new(0.0, 0.0, 2.0 * time().sin()))?;

    let still = scene.add(Node::sphere(1.0_f32, Vec3::ZERO, RED));
    let moving = scene.add(Node::sphere(1.5_f32, center, RED));
    Ok(scene.add(Node::intersection([still, moving])))
}

fn carved(scene: &mut SceneBuilder) -> Result<NodeId> {
    let time = clock();
    let (t1, t2, t3) = (time.clone(), time.clone(), time);
    let z = scene.dynamic(move || 3.0 * t1().sin() * Vec3::Z)?;
    let y = scene.dynamic(move || (1.5 * (t2() / 4.0).sin() - 1.5) * Vec3::Y)?;
    let x = scene.dynamic(move || 3.0 * (t3() / 2.0).sin() * Vec3::X)?;

    let core = scene.add(Node::sphere(1.0_f32, Vec3::ZERO, WHITE));
    let blobs = [z, y, x].map(|center| scene.add(Node::sphere(0.7_f32, center, WHITE)));
    let cavity = scene.add(Node::smooth_union(
        0.5_f32,
        std::iter::once(core).chain(blobs),
    ));
    let hollow = scene.add(Node::invert(cavity));

    let bounds = scene.add(Node::sphere(2.0_f32, Vec3::ZERO, WHITE));
    let floor = scene.add(Node::plane(Vec3::Y, 0.0_f32, WHITE));
    Ok(scene.add(Node::intersection([bounds, floor, hollow])))
}

fn spinning(scene: &mut SceneBuilder) -> Result<NodeId> {
    let time = clock();
    let spin = scene.dynamic(move || Mat4::from_rotation_y(time()))?;

    let ball = scene.add(Node::sphere(0.5_f32, Vec3::new(1.5, 0.0, 0.0), BLUE));
    let orbiting = scene.transform(spin, ball)?;
    let ground = scene.add(Node::plane(Vec3::Y, 0.5_f32, WHITE));
    Ok(scene.add(Node::union([orbiting, ground])))
}

// ===== Hyperbolic =====

/// Flat disc of `radius` on the `y = 0` plane
fn disc(scene: &mut SceneBuilder, radius: f32, albedo: Vec4) -> NodeId {
    let floor = scene.add(Node::plane_h(Vec4::Y, 0.0_f32, albedo));
    let bounds = scene.add(Node::sphere_h(radius, ORIGIN, albedo));
    scene.add(Node::intersection([floor, bounds]))
}

fn hyperbolic_spheres(scene: &mut SceneBuilder) -> Result<NodeId> {
    let here = scene.add(Node::sphere_h(0.1_f32, hyperbolic::lift(Vec3::ZERO), RED));
    let there = scene.add(Node::sphere_h(
        0.1_f32,
        hyperbolic::translation_x(1.0) * ORIGIN,
        RED,
    ));
    let ground = disc(scene, 2.0, WHITE);
    Ok(scene.add(Node::union([here, there, ground])))
}

fn hyperbolic_tiling_spheres(scene: &mut SceneBuilder) -> Result<NodeId> {
    let spheres = tiling::tiling(
        scene,
        4,
        5,
        2,
        |scene, placement| {
            let ball = scene.add(Node::sphere_h(
                0.2_f32,
                hyperbolic::translation_y(0.2) * ORIGIN,
                RED,
            ));
            scene.transform_h(placement, ball)
        },
        0.01,
    )?;
    let ground = disc(scene, 3.2, WHITE);
    Ok(scene.add(Node::union([spheres, ground])))
}

fn hyperbolic_room(scene: &mut SceneBuilder) -> Result<NodeId> {
    const SIDES: u32 = 12;
    const CORNERS: u32 = 4;

    let side_dist = tiling::apothem(SIDES, CORNERS);
    let vert_dist = tiling::circumradius(SIDES, CORNERS) - 0.2;

    let room = tiling::n_gon_prism(
        scene,
        SIDES,
        side_dist,
        1.0,
        WHITE,
        Mat4::from_rotation_y(PI / SIDES as f32),
    )?;
    let lifted = hyperbolic::translation_y(0.1);
    let front = scene.add(Node::sphere_h(
        0.1_f32,
        hyperbolic::translation_z(vert_dist) * lifted * ORIGIN,
        RED,
    ));
    let back = scene.add(Node::sphere_h(
        0.1_f32,
        hyperbolic::translation_z(-vert_dist) * lifted * ORIGIN,
        BLUE,
    ));
    Ok(scene.add(Node::union([room, front, back])))
}

/// Prism tiling shaded like one flat plane, with thin grout between cells
fn hyperbolic_floor(scene: &mut SceneBuilder, sides: u32, per_vertex: u32) -> Result<NodeId> {
    let shape = scene.add(Node::plane_h(Vec4::Y, 0.0_f32, Vec4::ZERO));
    let cells = tiling::tiling_prisms(scene, sides, per_vertex, 2, 0.1, 0.05, WHITE, 0.01)?;
    let grout = scene.add(Node::constant_h(0.001_f32, Vec4::Y, GRAY));
    let shading = scene.add(Node::union([cells, grout]));
    let floor = scene.add(Node::mix_match(shape, shading));

    let bounds = scene.add(Node::sphere_h(3.2_f32, ORIGIN, GRAY));
    Ok(scene.add(Node::intersection([floor, bounds])))
}
