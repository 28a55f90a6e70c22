//! CPU reference evaluation of a scene tree
//!
//! Computes, for a point, the same distance and hit record the generated
//! `GetDistance`/`GetHit` would. Useful for picking, collision and for
//! checking what a tree means without a GPU.
//!
//! Euclidean points are passed as `Vec4` with `w = 1` and Euclidean normals
//! come back with `w = 0`; hyperbolic points are hyperboloid coordinates.

// Explicit match arms per node kind mirror the emitted helpers one-to-one
#![allow(clippy::match_same_arms)]

use glam::{Mat4, Vec4};
use sdfc_math::{euclidean, hyperbolic, smooth_union, smooth_union_weight};

use crate::node::{Node, NodeId, Transform};
use crate::scene::SceneBuilder;
use crate::{Error, Result};

/// Host-side mirror of the shader's `HitResult`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub hit: bool,
    pub position: Vec4,
    pub dist: f32,
    pub normal: Vec4,
    pub albedo: Vec4,
}

impl HitRecord {
    fn surface(position: Vec4, dist: f32, normal: Vec4, albedo: Vec4) -> Self {
        Self {
            hit: true,
            position,
            dist,
            normal,
            albedo,
        }
    }
}

/// Read-only view of a scene's node arena for CPU evaluation
#[derive(Debug, Clone, Copy)]
pub struct CpuScene<'a> {
    nodes: &'a [Node],
}

impl<'a> CpuScene<'a> {
    pub fn new(scene: &'a SceneBuilder) -> Self {
        Self {
            nodes: scene.nodes(),
        }
    }

    /// Signed distance from `p` to the tree under `id`
    pub fn distance(&self, id: NodeId, p: Vec4) -> Result<f32> {
        match self.node(id)? {
            Node::Sphere(s) => Ok(euclidean::sphere(
                p.truncate(),
                s.center.value()?,
                s.radius.value()?,
            )),
            Node::Plane(pl) => Ok(euclidean::plane(
                p.truncate(),
                pl.normal.value()?,
                pl.offset.value()?,
            )),
            Node::Constant(c) => c.distance.value(),
            Node::SphereH(s) => Ok(hyperbolic::sphere(p, s.center.value()?, s.radius.value()?)),
            Node::PlaneH(pl) => Ok(hyperbolic::plane(p, pl.normal.value()?, pl.offset.value()?)),
            Node::ConstantH(c) => c.distance.value(),
            Node::Union(children) => self.fold_distance(id, children, p, f32::min),
            Node::Intersection(children) => self.fold_distance(id, children, p, f32::max),
            Node::SmoothUnion { k, children } => {
                let k = k.value()?;
                let distances = children
                    .iter()
                    .map(|c| self.distance(*c, p))
                    .collect::<Result<Vec<_>>>()?;
                distances
                    .into_iter()
                    .rev()
                    .reduce(|acc, d| smooth_union(d, acc, k))
                    .ok_or_else(|| no_children(id))
            }
            Node::Invert(child) => Ok(-self.distance(*child, p)?),
            Node::MixMatch { sdf, .. } => self.distance(*sdf, p),
            Node::Transform(t) => {
                let local = euclidean_point(t.forward.value()?, p);
                self.distance(t.child, local)
            }
            Node::TransformH(t) => self.distance(t.child, t.forward.value()? * p),
        }
    }

    /// Hit record at `p` for the tree under `id`
    pub fn hit(&self, id: NodeId, p: Vec4) -> Result<HitRecord> {
        match self.node(id)? {
            Node::Sphere(s) => {
                let center = s.center.value()?;
                Ok(HitRecord::surface(
                    p,
                    euclidean::sphere(p.truncate(), center, s.radius.value()?),
                    euclidean::sphere_normal(p.truncate(), center).extend(0.0),
                    s.albedo.value()?,
                ))
            }
            Node::Plane(pl) => {
                let normal = pl.normal.value()?;
                Ok(HitRecord::surface(
                    p,
                    euclidean::plane(p.truncate(), normal, pl.offset.value()?),
                    normal.extend(0.0),
                    pl.albedo.value()?,
                ))
            }
            Node::Constant(c) => Ok(HitRecord::surface(
                p,
                c.distance.value()?,
                c.normal.value()?.extend(0.0),
                c.albedo.value()?,
            )),
            Node::SphereH(s) => {
                let center = s.center.value()?;
                Ok(HitRecord::surface(
                    p,
                    hyperbolic::sphere(p, center, s.radius.value()?),
                    hyperbolic::sphere_normal(p, center),
                    s.albedo.value()?,
                ))
            }
            Node::PlaneH(pl) => {
                let normal = pl.normal.value()?;
                Ok(HitRecord::surface(
                    p,
                    hyperbolic::plane(p, normal, pl.offset.value()?),
                    hyperbolic::plane_normal(p, normal),
                    pl.albedo.value()?,
                ))
            }
            Node::ConstantH(c) => Ok(HitRecord::surface(
                p,
                c.distance.value()?,
                c.normal.value()?,
                c.albedo.value()?,
            )),
            Node::Union(children) => {
                self.fold_hit(id, children, p, |a, b| if a.dist <= b.dist { a } else { b })
            }
            Node::Intersection(children) => {
                self.fold_hit(id, children, p, |a, b| if a.dist >= b.dist { a } else { b })
            }
            Node::SmoothUnion { k, children } => {
                let k = k.value()?;
                let hits = children
                    .iter()
                    .map(|c| self.hit(*c, p))
                    .collect::<Result<Vec<_>>>()?;
                hits.into_iter()
                    .rev()
                    .reduce(|acc, h| smooth_union_hit(h, acc, k))
                    .ok_or_else(|| no_children(id))
            }
            Node::Invert(child) => {
                let mut h = self.hit(*child, p)?;
                h.dist = -h.dist;
                h.normal = -h.normal;
                Ok(h)
            }
            Node::MixMatch { hit, .. } => self.hit(*hit, p),
            Node::Transform(t) => self.transformed_hit(t, p, euclidean_point, |m, v| {
                euclidean::transform_direction(m, v.truncate()).extend(0.0)
            }),
            Node::TransformH(t) => self.transformed_hit(t, p, |m, v| m * v, |m, v| m * v),
        }
    }

    fn node(&self, id: NodeId) -> Result<&'a Node> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| Error::Lookup(format!("node {id} is not part of this scene")))
    }

    fn fold_distance(
        &self,
        id: NodeId,
        children: &[NodeId],
        p: Vec4,
        op: fn(f32, f32) -> f32,
    ) -> Result<f32> {
        let mut acc: Option<f32> = None;
        for child in children {
            let d = self.distance(*child, p)?;
            acc = Some(acc.map_or(d, |a| op(a, d)));
        }
        acc.ok_or_else(|| no_children(id))
    }

    fn fold_hit(
        &self,
        id: NodeId,
        children: &[NodeId],
        p: Vec4,
        op: fn(HitRecord, HitRecord) -> HitRecord,
    ) -> Result<HitRecord> {
        let mut acc: Option<HitRecord> = None;
        for child in children {
            let h = self.hit(*child, p)?;
            acc = Some(acc.map_or(h, |a| op(a, h)));
        }
        acc.ok_or_else(|| no_children(id))
    }

    fn transformed_hit(
        &self,
        t: &Transform,
        p: Vec4,
        point: impl Fn(Mat4, Vec4) -> Vec4,
        direction: impl Fn(Mat4, Vec4) -> Vec4,
    ) -> Result<HitRecord> {
        let mut h = self.hit(t.child, point(t.forward.value()?, p))?;
        let inverse = t.inverse.value()?;
        h.position = point(inverse, h.position);
        h.normal = direction(inverse, h.normal);
        Ok(h)
    }
}

/// Blend two hit records with the weight used for their distances
pub fn smooth_union_hit(a: HitRecord, b: HitRecord, k: f32) -> HitRecord {
    let h = smooth_union_weight(a.dist, b.dist, k);
    let mut result = if h >= 0.5 { a } else { b };
    result.dist = smooth_union(a.dist, b.dist, k);
    result.normal = b.normal.lerp(a.normal, h).normalize_or_zero();
    result.albedo = b.albedo.lerp(a.albedo, h);
    result
}

fn euclidean_point(m: Mat4, p: Vec4) -> Vec4 {
    euclidean::transform_point(m, p.truncate()).extend(1.0)
}

fn no_children(id: NodeId) -> Error {
    Error::Configuration(format!("combinator {id} has no children"))
}
