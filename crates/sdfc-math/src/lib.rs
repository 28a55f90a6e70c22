//! sdfc Math - Reference formulas for the emitted shader helpers
//!
//! Every helper function that `sdfc-scene` writes into a shader (`SphereSdf`,
//! `SmoothUnionHit`, `SphereHSdf`, ...) has a CPU counterpart here. The
//! reference evaluator uses these to answer "what would the shader compute at
//! this point", and the hyperbolic scene helpers use them to place geometry.
//!
//! # Conventions
//!
//! - Euclidean points are `Vec3`; matrices act on column vectors (`M * v`).
//! - Hyperbolic points live on the hyperboloid `x² + y² + z² - w² = -1, w > 0`
//!   and are stored as `Vec4`. The Minkowski inner product is
//!   `⟨a, b⟩ = a.xyz · b.xyz - a.w * b.w`.
//! - Smooth blends clamp the blend radius to [`MIN_BLEND`] so `k = 0`
//!   degenerates to a hard union instead of dividing by zero.
//!
//! # Example
//!
//! ```rust
//! use sdfc_math::hyperbolic::{self, ORIGIN};
//!
//! let p = hyperbolic::translation_x(1.5) * ORIGIN;
//! let d = hyperbolic::distance(ORIGIN, p);
//! assert!((d - 1.5).abs() < 1e-4);
//! ```

pub mod euclidean;
pub mod hyperbolic;

/// Smallest blend radius used by smooth combinators
pub const MIN_BLEND: f32 = 1e-6;

/// Clamp `x` into `[0, 1]` (HLSL `saturate`)
#[inline]
pub fn saturate(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Blend weight of the first operand in a polynomial smooth union
///
/// `1.0` means `d1` dominates completely, `0.0` means `d2` does. The same
/// weight drives the distance blend and the attribute blend of hit records.
#[inline]
pub fn smooth_union_weight(d1: f32, d2: f32, k: f32) -> f32 {
    saturate(0.5 + 0.5 * (d2 - d1) / k.max(MIN_BLEND))
}

/// Polynomial smooth minimum of two distances with blend radius `k`
#[inline]
pub fn smooth_union(d1: f32, d2: f32, k: f32) -> f32 {
    let h = smooth_union_weight(d1, d2, k);
    lerp(d2, d1, h) - k * h * (1.0 - h)
}

/// Linear interpolation (HLSL `lerp`)
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
