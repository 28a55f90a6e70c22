//! Shader helper functions written into the global segment
//!
//! Each helper is keyed by its function name. Helpers that call other helpers
//! list them in `requires`, and [`EmitContext::require`](super::EmitContext)
//! writes those first.

/// One shader function and the helpers it calls
#[derive(Debug)]
pub struct Helper {
    pub name: &'static str,
    pub body: &'static str,
    pub requires: &'static [&'static Helper],
}

// ===== Euclidean primitives =====

pub static SPHERE_SDF: Helper = Helper {
    name: "SphereSdf",
    body: include_str!("hlsl/sphere_sdf.hlsl"),
    requires: &[],
};

pub static SPHERE_HIT: Helper = Helper {
    name: "SphereHit",
    body: include_str!("hlsl/sphere_hit.hlsl"),
    requires: &[&SPHERE_SDF],
};

pub static PLANE_SDF: Helper = Helper {
    name: "PlaneSdf",
    body: include_str!("hlsl/plane_sdf.hlsl"),
    requires: &[],
};

pub static PLANE_HIT: Helper = Helper {
    name: "PlaneHit",
    body: include_str!("hlsl/plane_hit.hlsl"),
    requires: &[&PLANE_SDF],
};

pub static CONSTANT_HIT: Helper = Helper {
    name: "ConstantHit",
    body: include_str!("hlsl/constant_hit.hlsl"),
    requires: &[],
};

// ===== Combinators =====

pub static UNION_SDF: Helper = Helper {
    name: "UnionSdf",
    body: include_str!("hlsl/union_sdf.hlsl"),
    requires: &[],
};

pub static UNION_HIT: Helper = Helper {
    name: "UnionHit",
    body: include_str!("hlsl/union_hit.hlsl"),
    requires: &[],
};

pub static INTERSECTION_SDF: Helper = Helper {
    name: "IntersectionSdf",
    body: include_str!("hlsl/intersection_sdf.hlsl"),
    requires: &[],
};

pub static INTERSECTION_HIT: Helper = Helper {
    name: "IntersectionHit",
    body: include_str!("hlsl/intersection_hit.hlsl"),
    requires: &[],
};

pub static SMOOTH_UNION_WEIGHT: Helper = Helper {
    name: "SmoothUnionWeight",
    body: include_str!("hlsl/smooth_union_weight.hlsl"),
    requires: &[],
};

pub static SMOOTH_UNION_SDF: Helper = Helper {
    name: "SmoothUnionSdf",
    body: include_str!("hlsl/smooth_union_sdf.hlsl"),
    requires: &[&SMOOTH_UNION_WEIGHT],
};

pub static SMOOTH_UNION_HIT: Helper = Helper {
    name: "SmoothUnionHit",
    body: include_str!("hlsl/smooth_union_hit.hlsl"),
    requires: &[&SMOOTH_UNION_WEIGHT, &SMOOTH_UNION_SDF],
};

pub static INVERT_SDF: Helper = Helper {
    name: "InvertSdf",
    body: include_str!("hlsl/invert_sdf.hlsl"),
    requires: &[],
};

pub static INVERT_HIT: Helper = Helper {
    name: "InvertHit",
    body: include_str!("hlsl/invert_hit.hlsl"),
    requires: &[&INVERT_SDF],
};

// ===== Transforms =====

pub static TRANSFORM_POINT: Helper = Helper {
    name: "TransformPoint",
    body: include_str!("hlsl/transform_point.hlsl"),
    requires: &[],
};

pub static TRANSFORM_DIRECTION: Helper = Helper {
    name: "TransformDirection",
    body: include_str!("hlsl/transform_direction.hlsl"),
    requires: &[],
};

pub static TRANSFORM_POINT_H: Helper = Helper {
    name: "TransformPointH",
    body: include_str!("hlsl/transform_point_h.hlsl"),
    requires: &[],
};

pub static TRANSFORM_DIRECTION_H: Helper = Helper {
    name: "TransformDirectionH",
    body: include_str!("hlsl/transform_direction_h.hlsl"),
    requires: &[],
};

// ===== Hyperbolic primitives =====

pub static MINKOWSKI_DOT: Helper = Helper {
    name: "MinkowskiDot",
    body: include_str!("hlsl/minkowski_dot.hlsl"),
    requires: &[],
};

pub static SPHERE_H_SDF: Helper = Helper {
    name: "SphereHSdf",
    body: include_str!("hlsl/sphere_h_sdf.hlsl"),
    requires: &[&MINKOWSKI_DOT],
};

pub static SPHERE_H_HIT: Helper = Helper {
    name: "SphereHHit",
    body: include_str!("hlsl/sphere_h_hit.hlsl"),
    requires: &[&MINKOWSKI_DOT, &SPHERE_H_SDF],
};

pub static PLANE_H_SDF: Helper = Helper {
    name: "PlaneHSdf",
    body: include_str!("hlsl/plane_h_sdf.hlsl"),
    requires: &[&MINKOWSKI_DOT],
};

pub static PLANE_H_HIT: Helper = Helper {
    name: "PlaneHHit",
    body: include_str!("hlsl/plane_h_hit.hlsl"),
    requires: &[&MINKOWSKI_DOT, &PLANE_H_SDF],
};

pub static CONSTANT_H_HIT: Helper = Helper {
    name: "ConstantHHit",
    body: include_str!("hlsl/constant_h_hit.hlsl"),
    requires: &[],
};

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[&Helper] = &[
        &SPHERE_SDF,
        &SPHERE_HIT,
        &PLANE_SDF,
        &PLANE_HIT,
        &CONSTANT_HIT,
        &UNION_SDF,
        &UNION_HIT,
        &INTERSECTION_SDF,
        &INTERSECTION_HIT,
        &SMOOTH_UNION_WEIGHT,
        &SMOOTH_UNION_SDF,
        &SMOOTH_UNION_HIT,
        &INVERT_SDF,
        &INVERT_HIT,
        &TRANSFORM_POINT,
        &TRANSFORM_DIRECTION,
        &TRANSFORM_POINT_H,
        &TRANSFORM_DIRECTION_H,
        &MINKOWSKI_DOT,
        &SPHERE_H_SDF,
        &SPHERE_H_HIT,
        &PLANE_H_SDF,
        &PLANE_H_HIT,
        &CONSTANT_H_HIT,
    ];

    #[test]
    fn test_body_defines_its_name() {
        for helper in ALL {
            assert!(
                helper.body.contains(&format!(" {}(", helper.name)),
                "{} body does not define it",
                helper.name
            );
            assert!(helper.body.ends_with('\n'));
        }
    }

    #[test]
    fn test_requirements_are_called() {
        for helper in ALL {
            for dep in helper.requires {
                assert!(
                    helper.body.contains(&format!("{}(", dep.name)),
                    "{} lists {} but never calls it",
                    helper.name,
                    dep.name
                );
            }
        }
    }
}
