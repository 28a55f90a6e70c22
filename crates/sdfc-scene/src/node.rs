//! CSG node descriptions
//!
//! Nodes are plain data stored in a [`SceneBuilder`](crate::SceneBuilder)
//! arena and referenced by [`NodeId`]. They form a tree: a handle may be a
//! child of at most one parent, which is checked when the scene is prepared.
//!
//! ## Example
//!
//! ```rust
//! use sdfc_scene::{Node, SceneBuilder};
//! use sdfc_scene::glam::{Vec3, Vec4};
//!
//! let mut scene = SceneBuilder::default();
//! let a = scene.add(Node::sphere(1.0_f32, Vec3::ZERO, Vec4::ONE));
//! let b = scene.add(Node::sphere(0.5_f32, Vec3::new(1.0, 0.0, 0.0), Vec4::ONE));
//! let root = scene.add(Node::smooth_union(0.2_f32, [a, b]));
//! scene.set_root(root);
//! ```

use std::fmt;

use glam::{Mat4, Vec3, Vec4};

use crate::expression::Expression;

/// Handle of a node inside a scene's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Build progress of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Unprepared,
    /// Counted and validated, emission may run
    Prepared,
    /// Emitted into a finished shader; cannot be used again
    Finalized,
}

// ===== Euclidean primitives =====

/// Sphere around `center`
#[derive(Debug, Clone)]
pub struct Sphere {
    pub radius: Expression<f32>,
    pub center: Expression<Vec3>,
    pub albedo: Expression<Vec4>,
}

/// Half-space `dot(p, normal) + offset <= 0`
#[derive(Debug, Clone)]
pub struct Plane {
    pub normal: Expression<Vec3>,
    pub offset: Expression<f32>,
    pub albedo: Expression<Vec4>,
}

/// Fixed distance and surface attributes, independent of position
#[derive(Debug, Clone)]
pub struct Constant {
    pub distance: Expression<f32>,
    pub normal: Expression<Vec3>,
    pub albedo: Expression<Vec4>,
}

// ===== Hyperbolic primitives =====

/// Geodesic sphere on the hyperboloid
#[derive(Debug, Clone)]
pub struct SphereH {
    pub radius: Expression<f32>,
    pub center: Expression<Vec4>,
    pub albedo: Expression<Vec4>,
}

/// Geodesic plane with space-like unit normal
#[derive(Debug, Clone)]
pub struct PlaneH {
    pub normal: Expression<Vec4>,
    pub offset: Expression<f32>,
    pub albedo: Expression<Vec4>,
}

#[derive(Debug, Clone)]
pub struct ConstantH {
    pub distance: Expression<f32>,
    pub normal: Expression<Vec4>,
    pub albedo: Expression<Vec4>,
}

// ===== Transforms =====

/// Child placed in the parent frame through a pair of matrices
///
/// `forward` maps parent coordinates into the child's frame (it is applied to
/// the sample position), `inverse` maps child-frame hit positions and normals
/// back out.
#[derive(Debug, Clone)]
pub struct Transform {
    pub forward: Expression<Mat4>,
    pub inverse: Expression<Mat4>,
    pub child: NodeId,
}

/// One CSG node
#[derive(Debug, Clone)]
pub enum Node {
    Sphere(Sphere),
    Plane(Plane),
    /// Nearest of all children
    Union(Vec<NodeId>),
    /// Union with rounded creases of radius `k`
    SmoothUnion {
        k: Expression<f32>,
        children: Vec<NodeId>,
    },
    /// Farthest of all children
    Intersection(Vec<NodeId>),
    /// Swaps inside and outside
    Invert(NodeId),
    Transform(Transform),
    /// Distance from one subtree, hit attributes from another
    MixMatch { sdf: NodeId, hit: NodeId },
    Constant(Constant),
    SphereH(SphereH),
    PlaneH(PlaneH),
    TransformH(Transform),
    ConstantH(ConstantH),
}

impl Node {
    pub fn sphere(
        radius: impl Into<Expression<f32>>,
        center: impl Into<Expression<Vec3>>,
        albedo: impl Into<Expression<Vec4>>,
    ) -> Self {
        Self::Sphere(Sphere {
            radius: radius.into(),
            center: center.into(),
            albedo: albedo.into(),
        })
    }

    pub fn plane(
        normal: impl Into<Expression<Vec3>>,
        offset: impl Into<Expression<f32>>,
        albedo: impl Into<Expression<Vec4>>,
    ) -> Self {
        Self::Plane(Plane {
            normal: normal.into(),
            offset: offset.into(),
            albedo: albedo.into(),
        })
    }

    pub fn constant(
        distance: impl Into<Expression<f32>>,
        normal: impl Into<Expression<Vec3>>,
        albedo: impl Into<Expression<Vec4>>,
    ) -> Self {
        Self::Constant(Constant {
            distance: distance.into(),
            normal: normal.into(),
            albedo: albedo.into(),
        })
    }

    pub fn union(children: impl IntoIterator<Item = NodeId>) -> Self {
        Self::Union(children.into_iter().collect())
    }

    pub fn smooth_union(
        k: impl Into<Expression<f32>>,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        Self::SmoothUnion {
            k: k.into(),
            children: children.into_iter().collect(),
        }
    }

    pub fn intersection(children: impl IntoIterator<Item = NodeId>) -> Self {
        Self::Intersection(children.into_iter().collect())
    }

    pub fn invert(child: NodeId) -> Self {
        Self::Invert(child)
    }

    pub fn mix_match(sdf: NodeId, hit: NodeId) -> Self {
        Self::MixMatch { sdf, hit }
    }

    /// Euclidean transform from explicit forward/inverse matrices
    pub fn transform(
        forward: impl Into<Expression<Mat4>>,
        inverse: impl Into<Expression<Mat4>>,
        child: NodeId,
    ) -> Self {
        Self::Transform(Transform {
            forward: forward.into(),
            inverse: inverse.into(),
            child,
        })
    }

    pub fn sphere_h(
        radius: impl Into<Expression<f32>>,
        center: impl Into<Expression<Vec4>>,
        albedo: impl Into<Expression<Vec4>>,
    ) -> Self {
        Self::SphereH(SphereH {
            radius: radius.into(),
            center: center.into(),
            albedo: albedo.into(),
        })
    }

    pub fn plane_h(
        normal: impl Into<Expression<Vec4>>,
        offset: impl Into<Expression<f32>>,
        albedo: impl Into<Expression<Vec4>>,
    ) -> Self {
        Self::PlaneH(PlaneH {
            normal: normal.into(),
            offset: offset.into(),
            albedo: albedo.into(),
        })
    }

    pub fn constant_h(
        distance: impl Into<Expression<f32>>,
        normal: impl Into<Expression<Vec4>>,
        albedo: impl Into<Expression<Vec4>>,
    ) -> Self {
        Self::ConstantH(ConstantH {
            distance: distance.into(),
            normal: normal.into(),
            albedo: albedo.into(),
        })
    }

    /// Hyperbolic transform from explicit forward/inverse Lorentz matrices
    pub fn transform_h(
        forward: impl Into<Expression<Mat4>>,
        inverse: impl Into<Expression<Mat4>>,
        child: NodeId,
    ) -> Self {
        Self::TransformH(Transform {
            forward: forward.into(),
            inverse: inverse.into(),
            child,
        })
    }

    /// Direct children, left to right
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Union(children)
            | Self::SmoothUnion { children, .. }
            | Self::Intersection(children) => children.clone(),
            Self::Invert(child) => vec![*child],
            Self::Transform(t) | Self::TransformH(t) => vec![t.child],
            Self::MixMatch { sdf, hit } => vec![*sdf, *hit],
            Self::Sphere(_)
            | Self::Plane(_)
            | Self::Constant(_)
            | Self::SphereH(_)
            | Self::PlaneH(_)
            | Self::ConstantH(_) => Vec::new(),
        }
    }

    /// Whether the node combines an arbitrary number of children
    pub fn is_n_ary(&self) -> bool {
        matches!(
            self,
            Self::Union(_) | Self::SmoothUnion { .. } | Self::Intersection(_)
        )
    }

    /// Node type name for logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sphere(_) => "Sphere",
            Self::Plane(_) => "Plane",
            Self::Union(_) => "Union",
            Self::SmoothUnion { .. } => "SmoothUnion",
            Self::Intersection(_) => "Intersection",
            Self::Invert(_) => "Invert",
            Self::Transform(_) => "Transform",
            Self::MixMatch { .. } => "MixMatch",
            Self::Constant(_) => "Constant",
            Self::SphereH(_) => "SphereH",
            Self::PlaneH(_) => "PlaneH",
            Self::TransformH(_) => "TransformH",
            Self::ConstantH(_) => "ConstantH",
        }
    }
}
