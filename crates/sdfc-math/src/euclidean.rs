//! Euclidean distance formulas
//!
//! Mirrors the helper functions emitted for `Sphere`, `Plane`, the Boolean
//! combinators and `Transform`.

use glam::{Mat4, Vec3};

/// Distance from `p` to a sphere
#[inline]
pub fn sphere(p: Vec3, center: Vec3, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Outward surface normal of a sphere at `p`
///
/// Returns zero at the center, where the direction is undefined.
#[inline]
pub fn sphere_normal(p: Vec3, center: Vec3) -> Vec3 {
    (p - center).normalize_or_zero()
}

/// Signed distance to the plane `dot(p, n) + d = 0`
///
/// `n` is expected to be unit length; the distance scales with it otherwise.
#[inline]
pub fn plane(p: Vec3, normal: Vec3, offset: f32) -> f32 {
    p.dot(normal) + offset
}

/// Map a point through an affine transform (`w = 1`)
#[inline]
pub fn transform_point(m: Mat4, p: Vec3) -> Vec3 {
    m.transform_point3(p)
}

/// Map a direction through a transform (`w = 0`) and renormalize
#[inline]
pub fn transform_direction(m: Mat4, v: Vec3) -> Vec3 {
    m.transform_vector3(v).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_sign() {
        let c = Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(sphere(Vec3::new(3.0, 0.0, 0.0), c, 1.0), 1.0);
        assert_relative_eq!(sphere(c, c, 1.0), -1.0);
    }

    #[test]
    fn test_sphere_normal_points_outward() {
        let n = sphere_normal(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO);
        assert_relative_eq!(n.y, 1.0);
        assert_eq!(sphere_normal(Vec3::ZERO, Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_plane_offset() {
        let d = plane(Vec3::new(0.0, 2.0, 0.0), Vec3::Y, -0.5);
        assert_relative_eq!(d, 1.5);
    }

    #[test]
    fn test_transform_round_trip() {
        let m = Mat4::from_rotation_z(0.7) * Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let p = Vec3::new(-0.5, 0.25, 4.0);
        let back = transform_point(m.inverse(), transform_point(m, p));
        assert!((back - p).length() < 1e-5);
    }

    #[test]
    fn test_direction_ignores_translation() {
        let m = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(transform_direction(m, Vec3::Y).y, 1.0);
    }
}
