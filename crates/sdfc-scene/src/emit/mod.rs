//! Node tree to shader text
//!
//! Emission runs once per [`Pass`]. Each node returns an expression of the
//! pass's result type and may push statements that have to run before that
//! expression is evaluated. The sample position is always the variable `p`;
//! transforms overwrite it for their subtree and restore it afterwards.
//!
//! Helper functions go to the scene's global [`MarkedSegment`] keyed by
//! function name, so every helper is written once per shader.

mod combinators;
pub mod helpers;
mod transform;

use crate::expression::Expression;
use crate::node::{Node, NodeId};
use crate::source::{MarkedSegment, NameGenerator, SourceBuilder};
use crate::types::TypeRegistry;
use crate::{Error, Result};

use helpers::Helper;

/// Which scene function is being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// `float GetDistance(Pos p)`
    Distance,
    /// `HitResult GetHit(Pos p)`
    Hit,
}

impl Pass {
    /// Shader type of the expressions this pass produces
    pub fn result_type(self) -> &'static str {
        match self {
            Self::Distance => "float",
            Self::Hit => "HitResult",
        }
    }

    fn local_prefix(self) -> &'static str {
        match self {
            Self::Distance => "localSdf",
            Self::Hit => "localHit",
        }
    }

    fn accumulator_prefix(self) -> &'static str {
        match self {
            Self::Distance => "accSdf",
            Self::Hit => "accHit",
        }
    }
}

/// State shared by one emission pass over the node arena
pub struct EmitContext<'a> {
    nodes: &'a [Node],
    registry: &'a TypeRegistry,
    global: &'a mut MarkedSegment,
    names: &'a mut NameGenerator,
}

impl<'a> EmitContext<'a> {
    pub fn new(
        nodes: &'a [Node],
        registry: &'a TypeRegistry,
        global: &'a mut MarkedSegment,
        names: &'a mut NameGenerator,
    ) -> Self {
        Self {
            nodes,
            registry,
            global,
            names,
        }
    }

    /// Distance expression for `id`, with setup statements pushed to `sb`
    pub fn sdf(&mut self, id: NodeId, sb: &mut SourceBuilder) -> Result<String> {
        self.emit(Pass::Distance, id, sb)
    }

    /// Hit-record expression for `id`, with setup statements pushed to `sb`
    pub fn hit(&mut self, id: NodeId, sb: &mut SourceBuilder) -> Result<String> {
        self.emit(Pass::Hit, id, sb)
    }

    /// Write `helper` (after the helpers it calls) unless already present
    pub fn require(&mut self, helper: &'static Helper) {
        if self.global.has_mark(helper.name) {
            return;
        }
        for dependency in helper.requires {
            self.require(dependency);
        }
        self.global.mark_and_append(helper.name, helper.body);
    }

    // One arm per node kind and pass
    #[allow(clippy::too_many_lines)]
    pub fn emit(&mut self, pass: Pass, id: NodeId, sb: &mut SourceBuilder) -> Result<String> {
        let nodes = self.nodes;
        let node = nodes
            .get(id.index())
            .ok_or_else(|| Error::Lookup(format!("node {id} is not part of this scene")))?;

        match (node, pass) {
            (Node::Sphere(s), Pass::Distance) => self.call(
                &helpers::SPHERE_SDF,
                &[self.source(&s.center)?, self.source(&s.radius)?],
            ),
            (Node::Sphere(s), Pass::Hit) => self.call(
                &helpers::SPHERE_HIT,
                &[
                    self.source(&s.center)?,
                    self.source(&s.radius)?,
                    self.source(&s.albedo)?,
                ],
            ),
            (Node::Plane(pl), Pass::Distance) => self.call(
                &helpers::PLANE_SDF,
                &[self.source(&pl.normal)?, self.source(&pl.offset)?],
            ),
            (Node::Plane(pl), Pass::Hit) => self.call(
                &helpers::PLANE_HIT,
                &[
                    self.source(&pl.normal)?,
                    self.source(&pl.offset)?,
                    self.source(&pl.albedo)?,
                ],
            ),
            (Node::Constant(c), Pass::Distance) => Ok(format!("({})", self.source(&c.distance)?)),
            (Node::Constant(c), Pass::Hit) => self.call(
                &helpers::CONSTANT_HIT,
                &[
                    self.source(&c.distance)?,
                    self.source(&c.normal)?,
                    self.source(&c.albedo)?,
                ],
            ),
            (Node::SphereH(s), Pass::Distance) => self.call(
                &helpers::SPHERE_H_SDF,
                &[self.source(&s.center)?, self.source(&s.radius)?],
            ),
            (Node::SphereH(s), Pass::Hit) => self.call(
                &helpers::SPHERE_H_HIT,
                &[
                    self.source(&s.center)?,
                    self.source(&s.radius)?,
                    self.source(&s.albedo)?,
                ],
            ),
            (Node::PlaneH(pl), Pass::Distance) => self.call(
                &helpers::PLANE_H_SDF,
                &[self.source(&pl.normal)?, self.source(&pl.offset)?],
            ),
            (Node::PlaneH(pl), Pass::Hit) => self.call(
                &helpers::PLANE_H_HIT,
                &[
                    self.source(&pl.normal)?,
                    self.source(&pl.offset)?,
                    self.source(&pl.albedo)?,
                ],
            ),
            (Node::ConstantH(c), Pass::Distance) => Ok(format!("({})", self.source(&c.distance)?)),
            (Node::ConstantH(c), Pass::Hit) => self.call(
                &helpers::CONSTANT_H_HIT,
                &[
                    self.source(&c.distance)?,
                    self.source(&c.normal)?,
                    self.source(&c.albedo)?,
                ],
            ),
            (Node::Union(children), Pass::Distance) => {
                self.accumulate(pass, &helpers::UNION_SDF, children, sb)
            }
            (Node::Union(children), Pass::Hit) => {
                self.accumulate(pass, &helpers::UNION_HIT, children, sb)
            }
            (Node::Intersection(children), Pass::Distance) => {
                self.accumulate(pass, &helpers::INTERSECTION_SDF, children, sb)
            }
            (Node::Intersection(children), Pass::Hit) => {
                self.accumulate(pass, &helpers::INTERSECTION_HIT, children, sb)
            }
            (Node::SmoothUnion { k, children }, _) => {
                let helper = match pass {
                    Pass::Distance => &helpers::SMOOTH_UNION_SDF,
                    Pass::Hit => &helpers::SMOOTH_UNION_HIT,
                };
                let k = self.source(k)?;
                self.nest(pass, helper, &k, children, sb)
            }
            (Node::Invert(child), _) => {
                let helper = match pass {
                    Pass::Distance => &helpers::INVERT_SDF,
                    Pass::Hit => &helpers::INVERT_HIT,
                };
                let inner = self.emit(pass, *child, sb)?;
                self.require(helper);
                Ok(format!("{}({})", helper.name, inner))
            }
            (Node::MixMatch { sdf, .. }, Pass::Distance) => self.emit(pass, *sdf, sb),
            (Node::MixMatch { hit, .. }, Pass::Hit) => self.emit(pass, *hit, sb),
            (Node::Transform(t), _) => self.transform(pass, &transform::EUCLIDEAN, t, sb),
            (Node::TransformH(t), _) => self.transform(pass, &transform::HYPERBOLIC, t, sb),
        }
    }

    /// Text of an expression field
    fn source<T: 'static>(&self, expression: &Expression<T>) -> Result<String> {
        expression.build_source(self.registry)
    }

    /// `Helper(p, args...)` for a primitive evaluated at the current position
    #[allow(clippy::unnecessary_wraps)]
    fn call(&mut self, helper: &'static Helper, args: &[String]) -> Result<String> {
        self.require(helper);
        Ok(format!("{}(p, {})", helper.name, args.join(", ")))
    }

    fn fresh_name(&mut self, prefix: &str) -> String {
        self.names.new_variable_name(prefix)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    fn emit_one(nodes: &[Node], pass: Pass) -> (String, String, String) {
        let registry = TypeRegistry::with_builtins();
        let mut global = MarkedSegment::new();
        let mut names = NameGenerator::new();
        let mut sb = SourceBuilder::new();
        let root = NodeId(nodes.len() - 1);
        let expr = EmitContext::new(nodes, &registry, &mut global, &mut names)
            .emit(pass, root, &mut sb)
            .unwrap();
        (expr, sb.into_string(), global.as_str().to_string())
    }

    #[test]
    fn test_sphere_expression() {
        let nodes = [Node::sphere(0.5_f32, Vec3::ZERO, Vec4::ONE)];
        let (expr, statements, global) = emit_one(&nodes, Pass::Distance);
        assert_eq!(expr, "SphereSdf(p, float3(0.0, 0.0, 0.0), 0.5)");
        assert!(statements.is_empty());
        assert!(global.contains("float SphereSdf("));
        assert!(!global.contains("SphereHit"));
    }

    #[test]
    fn test_hit_pass_pulls_in_distance_helper() {
        let nodes = [Node::sphere(0.5_f32, Vec3::ZERO, Vec4::ONE)];
        let (expr, _, global) = emit_one(&nodes, Pass::Hit);
        assert!(expr.starts_with("SphereHit(p, "));
        let sdf = global.find("float SphereSdf(").unwrap();
        let hit = global.find("HitResult SphereHit(").unwrap();
        assert!(sdf < hit);
    }

    #[test]
    fn test_constant_distance_is_parenthesized() {
        let nodes = [Node::constant(-1.5_f32, Vec3::Y, Vec4::ONE)];
        let (expr, _, global) = emit_one(&nodes, Pass::Distance);
        assert_eq!(expr, "(-1.5)");
        assert!(global.is_empty());
    }

    #[test]
    fn test_invert_wraps_child() {
        let nodes = [
            Node::sphere(1.0_f32, Vec3::ZERO, Vec4::ONE),
            Node::invert(NodeId(0)),
        ];
        let (expr, _, _) = emit_one(&nodes, Pass::Hit);
        assert!(expr.starts_with("InvertHit(SphereHit(p, "));
    }

    #[test]
    fn test_mix_match_picks_subtree_per_pass() {
        let nodes = [
            Node::sphere(1.0_f32, Vec3::ZERO, Vec4::ONE),
            Node::plane(Vec3::Y, 0.0_f32, Vec4::ONE),
            Node::mix_match(NodeId(0), NodeId(1)),
        ];
        let (sdf, _, sdf_global) = emit_one(&nodes, Pass::Distance);
        let (hit, _, hit_global) = emit_one(&nodes, Pass::Hit);
        assert!(sdf.starts_with("SphereSdf("));
        assert!(hit.starts_with("PlaneHit("));
        assert!(!sdf_global.contains("Plane"));
        assert!(!hit_global.contains("Sphere"));
    }

    #[test]
    fn test_unknown_handle() {
        let registry = TypeRegistry::with_builtins();
        let mut global = MarkedSegment::new();
        let mut names = NameGenerator::new();
        let mut sb = SourceBuilder::new();
        let result = EmitContext::new(&[], &registry, &mut global, &mut names).sdf(NodeId(3), &mut sb);
        assert!(matches!(result, Err(Error::Lookup(_))));
    }

    #[test]
    fn test_require_is_idempotent() {
        let registry = TypeRegistry::with_builtins();
        let mut global = MarkedSegment::new();
        let mut names = NameGenerator::new();
        let mut ctx = EmitContext::new(&[], &registry, &mut global, &mut names);
        ctx.require(&helpers::SMOOTH_UNION_HIT);
        ctx.require(&helpers::SMOOTH_UNION_SDF);
        ctx.require(&helpers::SMOOTH_UNION_HIT);
        let text = global.as_str();
        assert_eq!(text.matches("float SmoothUnionWeight(").count(), 1);
        assert_eq!(text.matches("float SmoothUnionSdf(").count(), 1);
        assert_eq!(text.matches("HitResult SmoothUnionHit(").count(), 1);
    }
}
