//! Hyperbolic scene construction helpers
//!
//! Regular `{p, q}` tilings of the hyperbolic plane (p-gons, q around each
//! vertex) laid out on the `y = 0` plane of the hyperboloid, and n-gon
//! prisms to fill their cells.
//!
//! ## Example
//!
//! ```rust
//! use sdfc_scene::{SceneBuilder, SceneConfig, tiling};
//! use sdfc_scene::glam::Vec4;
//!
//! let mut scene = SceneBuilder::new(SceneConfig::hyperbolic());
//! // Square cells, five around each vertex, two rings out from the center
//! let floor = tiling::tiling_prisms(&mut scene, 4, 5, 2, 0.1, 0.05, Vec4::ONE, 0.01)?;
//! scene.set_root(floor);
//! # Ok::<(), sdfc_scene::Error>(())
//! ```

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec4};
use sdfc_math::hyperbolic::{ORIGIN, translation_z, triangle_side};

use crate::node::{Node, NodeId};
use crate::scene::SceneBuilder;
use crate::{Error, Result};

/// Geodesic distance from a `{sides, per_vertex}` cell center to its edge midpoints
pub fn apothem(sides: u32, per_vertex: u32) -> f32 {
    let central = TAU / sides as f32;
    let interior = TAU / per_vertex as f32;
    triangle_side(interior / 2.0, central / 2.0, FRAC_PI_2)
}

/// Geodesic distance from a `{sides, per_vertex}` cell center to its corners
pub fn circumradius(sides: u32, per_vertex: u32) -> f32 {
    let central = TAU / sides as f32;
    let interior = TAU / per_vertex as f32;
    triangle_side(FRAC_PI_2, central / 2.0, interior / 2.0)
}

/// Regular n-gon prism standing on the `y = 0` plane of `base`
///
/// Side walls sit `side_dist` from the center, the slab reaches `thickness`
/// below the plane.
pub fn n_gon_prism(
    scene: &mut SceneBuilder,
    sides: u32,
    side_dist: f32,
    thickness: f32,
    albedo: Vec4,
    base: Mat4,
) -> Result<NodeId> {
    if sides < 3 {
        return Err(Error::Configuration(format!(
            "a prism needs at least 3 sides, got {sides}"
        )));
    }

    let mut walls = Vec::with_capacity(sides as usize + 1);
    for i in 0..sides {
        let angle = TAU / sides as f32 * i as f32;
        let wall = scene.add(Node::plane_h(Vec4::Z, 0.0_f32, albedo));
        let placement = base * Mat4::from_rotation_y(angle) * translation_z(side_dist);
        walls.push(scene.transform_h(placement, wall)?);
    }

    let top = scene.add(Node::plane_h(Vec4::Y, 0.0_f32, albedo));
    let bottom = scene.add(Node::plane_h(Vec4::NEG_Y, -thickness, albedo));
    let slab = scene.add(Node::intersection([top, bottom]));
    walls.push(scene.transform_h(base, slab)?);

    Ok(scene.add(Node::intersection(walls)))
}

/// Union of one object per cell of a `{sides, per_vertex}` tiling
///
/// Cells are visited breadth-first, `depth` rings out from the cell at the
/// origin. Neighbours lie across the walls of an [`n_gon_prism`] with the same
/// placement. `new_obj` receives the cell's placement (cell frame to world) and
/// returns the node for that cell. Cells whose centers land within
/// `epsilon` (squared, in hyperboloid coordinates) of a known center are
/// skipped.
pub fn tiling<F>(
    scene: &mut SceneBuilder,
    sides: u32,
    per_vertex: u32,
    depth: u32,
    mut new_obj: F,
    epsilon: f32,
) -> Result<NodeId>
where
    F: FnMut(&mut SceneBuilder, Mat4) -> Result<NodeId>,
{
    if sides < 3 || per_vertex < 3 {
        return Err(Error::Configuration(format!(
            "{{{sides}, {per_vertex}}} is not a tiling"
        )));
    }
    // Flat and spherical tilings have no hyperbolic cell size
    if (sides - 2) * (per_vertex - 2) <= 4 {
        return Err(Error::Configuration(format!(
            "{{{sides}, {per_vertex}}} is not a hyperbolic tiling"
        )));
    }

    let central = TAU / sides as f32;
    let step = 2.0 * apothem(sides, per_vertex);
    // Odd cells have a corner opposite each wall; turn them so a wall faces the parent
    let turn = if sides % 2 == 1 {
        Mat4::from_rotation_y(central / 2.0)
    } else {
        Mat4::IDENTITY
    };

    let mut found = vec![ORIGIN];
    let mut cells = vec![new_obj(scene, Mat4::IDENTITY)?];
    let mut frontier = vec![Mat4::IDENTITY];

    for ring in 0..depth {
        let mut next = Vec::new();
        for parent in &frontier {
            for i in 0..sides {
                let angle = i as f32 * central;
                let placement =
                    *parent * Mat4::from_rotation_y(angle) * translation_z(step) * turn;
                let center = placement * ORIGIN;

                if found.iter().any(|c: &Vec4| c.distance_squared(center) < epsilon) {
                    continue;
                }
                found.push(center);
                next.push(placement);
                cells.push(new_obj(scene, placement)?);
            }
        }
        tracing::trace!(ring, cells = next.len(), "Expanded tiling ring");
        frontier = next;
    }

    tracing::debug!(sides, per_vertex, depth, cells = cells.len(), "Built tiling");
    Ok(scene.add(Node::union(cells)))
}

/// Tiling whose cells are prisms, `padding` narrower than the cells
pub fn tiling_prisms(
    scene: &mut SceneBuilder,
    sides: u32,
    per_vertex: u32,
    depth: u32,
    thickness: f32,
    padding: f32,
    albedo: Vec4,
    epsilon: f32,
) -> Result<NodeId> {
    let side_dist = apothem(sides, per_vertex) - padding;
    tiling(
        scene,
        sides,
        per_vertex,
        depth,
        |scene, placement| n_gon_prism(scene, sides, side_dist, thickness, albedo, placement),
        epsilon,
    )
}
