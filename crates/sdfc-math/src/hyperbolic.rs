//! Hyperbolic (hyperboloid model) formulas
//!
//! Points are unit time-like vectors of Minkowski space, directions at a point
//! are space-like vectors orthogonal to it. Isometries are Lorentz matrices,
//! so transforms map points and tangent vectors with the same matrix.

use glam::{Mat4, Vec3, Vec4};

/// The hyperboloid's base point
pub const ORIGIN: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Minkowski inner product `a.xyz · b.xyz - a.w * b.w`
#[inline]
pub fn minkowski_dot(a: Vec4, b: Vec4) -> f32 {
    a.truncate().dot(b.truncate()) - a.w * b.w
}

/// Lift a Euclidean offset onto the hyperboloid above it
#[inline]
pub fn lift(v: Vec3) -> Vec4 {
    v.extend((1.0 + v.length_squared()).sqrt())
}

/// Geodesic distance between two hyperboloid points
#[inline]
pub fn distance(a: Vec4, b: Vec4) -> f32 {
    (-minkowski_dot(a, b)).max(1.0).acosh()
}

/// Distance from `p` to a geodesic sphere
#[inline]
pub fn sphere(p: Vec4, center: Vec4, radius: f32) -> f32 {
    distance(p, center) - radius
}

/// Unit tangent at `p` pointing away from `center`
///
/// Degenerates to (almost) zero when `p` coincides with the center.
pub fn sphere_normal(p: Vec4, center: Vec4) -> Vec4 {
    let cosh_d = (-minkowski_dot(p, center)).max(1.0);
    let sinh_d = (cosh_d * cosh_d - 1.0).sqrt().max(1e-6);
    (p * cosh_d - center) / sinh_d
}

/// Signed distance to the geodesic plane with unit space-like normal `n`
#[inline]
pub fn plane(p: Vec4, normal: Vec4, offset: f32) -> f32 {
    minkowski_dot(p, normal).asinh() + offset
}

/// Unit tangent at `p` pointing away from the plane
pub fn plane_normal(p: Vec4, normal: Vec4) -> Vec4 {
    let s = minkowski_dot(p, normal);
    (normal + p * s) / (1.0 + s * s).sqrt()
}

/// Lorentz boost moving the origin `distance` along +X
pub fn translation_x(distance: f32) -> Mat4 {
    let (s, c) = (distance.sinh(), distance.cosh());
    Mat4::from_cols(
        Vec4::new(c, 0.0, 0.0, s),
        Vec4::Y,
        Vec4::Z,
        Vec4::new(s, 0.0, 0.0, c),
    )
}

/// Lorentz boost moving the origin `distance` along +Y
pub fn translation_y(distance: f32) -> Mat4 {
    let (s, c) = (distance.sinh(), distance.cosh());
    Mat4::from_cols(
        Vec4::X,
        Vec4::new(0.0, c, 0.0, s),
        Vec4::Z,
        Vec4::new(0.0, s, 0.0, c),
    )
}

/// Lorentz boost moving the origin `distance` along +Z
pub fn translation_z(distance: f32) -> Mat4 {
    let (s, c) = (distance.sinh(), distance.cosh());
    Mat4::from_cols(
        Vec4::X,
        Vec4::Y,
        Vec4::new(0.0, 0.0, c, s),
        Vec4::new(0.0, 0.0, s, c),
    )
}

/// Side length of a hyperbolic triangle from its three angles
///
/// Hyperbolic law of cosines for angles: the side opposite `opposite`, given
/// the two angles adjacent to that side. Returns `0.0` for Euclidean
/// (angle-sum = π) configurations.
pub fn triangle_side(opposite: f32, adjacent1: f32, adjacent2: f32) -> f32 {
    let cosh_side = (opposite.cos() + adjacent1.cos() * adjacent2.cos())
        / (adjacent1.sin() * adjacent2.sin());
    cosh_side.max(1.0).acosh()
}
