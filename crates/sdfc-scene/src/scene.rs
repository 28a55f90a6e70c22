//! Scene assembly
//!
//! [`SceneBuilder`] owns everything one shader needs: the node arena, the
//! type registry, the constant-buffer and global-function segments and the
//! list of per-frame parameter writers. [`SceneBuilder::build_source`] turns
//! the tree under the root node into the final shader text.
//!
//! ## Example
//!
//! ```rust
//! use sdfc_scene::{Node, SceneBuilder};
//! use sdfc_scene::glam::{Mat4, Vec3, Vec4};
//!
//! let mut scene = SceneBuilder::default();
//! scene.define_camera_transform::<Mat4>("camTransform")?;
//!
//! let ball = scene.add(Node::sphere(1.0_f32, Vec3::ZERO, Vec4::ONE));
//! let floor = scene.add(Node::plane(Vec3::Y, 1.0_f32, Vec4::ONE));
//! let root = scene.add(Node::union([ball, floor]));
//! scene.set_root(root);
//!
//! let source = scene.build_source()?;
//! assert!(source.contains("float GetDistance(Pos p)"));
//! # Ok::<(), sdfc_scene::Error>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::Pod;
use glam::Mat4;

use crate::compile::{CompiledScene, ShaderCompiler};
use crate::config::SceneConfig;
use crate::emit::EmitContext;
use crate::expression::{Dynamic, Evaluator, Expression};
use crate::node::{Node, NodeId, NodeState};
use crate::params::{Parameter, ParameterFeed, ParameterSink};
use crate::source::{INDENT, MarkedSegment, NameGenerator, SourceBuilder};
use crate::types::{TypeDescriptor, TypeRegistry};
use crate::{Error, Result};

/// Builds one scene shader and its parameter feed
pub struct SceneBuilder {
    config: SceneConfig,
    registry: TypeRegistry,
    cbuffer: MarkedSegment,
    global: MarkedSegment,
    names: NameGenerator,
    nodes: Vec<Node>,
    states: Vec<NodeState>,
    root: Option<NodeId>,
    camera_transform: Option<String>,
    parameters: Vec<Parameter>,
    feeds: Vec<ParameterFeed>,
}

impl SceneBuilder {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            registry: TypeRegistry::with_builtins(),
            cbuffer: MarkedSegment::new(),
            global: MarkedSegment::new(),
            names: NameGenerator::new(),
            nodes: Vec::new(),
            states: Vec::new(),
            root: None,
            camera_transform: None,
            parameters: Vec::new(),
            feeds: Vec::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Teach the scene a new host type (or override a built-in)
    pub fn register_type<T: 'static>(&mut self, descriptor: TypeDescriptor<T>) {
        self.registry.register(descriptor);
    }

    // ===== Nodes =====

    /// Put a node into the arena
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        tracing::trace!(node = %id, kind = node.kind(), "Adding node");
        self.nodes.push(node);
        self.states.push(NodeState::Unprepared);
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.index()).ok_or_else(|| unknown_node(id))
    }

    pub fn state(&self, id: NodeId) -> Result<NodeState> {
        self.states.get(id.index()).copied().ok_or_else(|| unknown_node(id))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Euclidean transform of `child`, given its object-to-parent matrix
    ///
    /// The parent-to-object matrix applied to sample positions is derived with
    /// [`Expression::apply`], so a dynamic matrix stays dynamic.
    pub fn transform(
        &mut self,
        object_to_parent: impl Into<Expression<Mat4>>,
        child: NodeId,
    ) -> Result<NodeId> {
        let inverse = object_to_parent.into();
        let forward = inverse.apply(self, |m: Mat4| m.inverse())?;
        Ok(self.add(Node::transform(forward, inverse, child)))
    }

    /// Hyperbolic transform of `child`, given its object-to-parent isometry
    pub fn transform_h(
        &mut self,
        object_to_parent: impl Into<Expression<Mat4>>,
        child: NodeId,
    ) -> Result<NodeId> {
        let inverse = object_to_parent.into();
        let forward = inverse.apply(self, |m: Mat4| m.inverse())?;
        Ok(self.add(Node::transform_h(forward, inverse, child)))
    }

    // ===== Parameters =====

    /// Declare constant-buffer member `name` of type `T`
    ///
    /// Declaring the same name again is a no-op.
    pub fn define_parameter<T: 'static>(&mut self, name: &str) -> Result<()> {
        let type_name = self.registry.describe::<T>()?.type_name().to_string();

        if let Some(existing) = self.parameters.iter().find(|p| p.name == name) {
            if existing.type_name != type_name {
                tracing::warn!(
                    name,
                    declared = %existing.type_name,
                    requested = %type_name,
                    "Parameter already declared with a different type"
                );
            }
            return Ok(());
        }

        self.cbuffer
            .mark_and_append_line(name, &format!("{INDENT}{type_name} {name};"));
        tracing::trace!(name, type_name = %type_name, "Declared parameter");
        self.parameters.push(Parameter {
            name: name.to_string(),
            type_name,
            size: size_of::<T>(),
        });
        Ok(())
    }

    /// Declare the member `GetTransform` returns
    ///
    /// A scene has exactly one camera transform.
    pub fn define_camera_transform<T: 'static>(&mut self, name: &str) -> Result<()> {
        if let Some(existing) = &self.camera_transform {
            return Err(Error::Configuration(format!(
                "camera transform already defined as {existing}"
            )));
        }
        self.define_parameter::<T>(name)?;
        self.camera_transform = Some(name.to_string());
        Ok(())
    }

    pub fn camera_transform(&self) -> Option<&str> {
        self.camera_transform.as_deref()
    }

    /// An expression re-evaluated on the host every frame
    ///
    /// Allocates a fresh constant-buffer member and a feed writing `f()` into
    /// it before each dispatch. Names the caller already declared are skipped.
    pub fn dynamic<T, F>(&mut self, f: F) -> Result<Expression<T>>
    where
        T: Pod + Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let slot = loop {
            let name = self.names.new_variable_name("expr");
            if !self.parameters.iter().any(|p| p.name == name) {
                break name;
            }
            tracing::trace!(name, "Slot name already declared, drawing another");
        };
        self.define_parameter::<T>(&slot)?;

        let evaluator: Evaluator<T> = Arc::new(f);
        let feed_evaluator = Arc::clone(&evaluator);
        let feed_slot = slot.clone();
        self.feeds.push(ParameterFeed::new(slot.clone(), move |sink| {
            sink.write_value(&feed_slot, &feed_evaluator())
        }));

        Ok(Expression::Dynamic(Dynamic::new(slot, evaluator)))
    }

    /// Register an extra per-frame writer (camera controllers, lights, ...)
    ///
    /// Runs after the writers registered before it.
    pub fn on_frame<F>(&mut self, label: impl Into<String>, f: F)
    where
        F: Fn(&mut dyn ParameterSink) -> Result<()> + Send + Sync + 'static,
    {
        self.feeds.push(ParameterFeed::new(label, f));
    }

    /// Declared members in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn feeds(&self) -> &[ParameterFeed] {
        &self.feeds
    }

    /// Run every feed against `sink`
    pub fn write_parameters(&self, sink: &mut dyn ParameterSink) -> Result<()> {
        self.feeds.iter().try_for_each(|feed| feed.run(sink))
    }

    // ===== Building =====

    /// Generate the complete shader source
    ///
    /// Consumes the tree under the root: its nodes end up `Finalized` and
    /// cannot be built again.
    pub fn build_source(&mut self) -> Result<String> {
        let root = self
            .root
            .ok_or_else(|| Error::Configuration("no root node set".to_string()))?;
        let camera = self
            .camera_transform
            .clone()
            .ok_or_else(|| Error::Configuration("camera transform not defined".to_string()))?;

        let tree = self.prepare(root)?;
        tracing::debug!(root = %root, nodes = tree.len(), "Prepared scene tree");

        let (distance, hit) = match self.emit_functions(root) {
            Ok(bodies) => bodies,
            Err(e) => {
                self.set_states(&tree, NodeState::Unprepared);
                return Err(e);
            }
        };

        let source = self.assemble(&camera, &distance, &hit);
        self.set_states(&tree, NodeState::Finalized);
        tracing::debug!(
            bytes = source.len(),
            parameters = self.parameters.len(),
            "Built scene source"
        );
        Ok(source)
    }

    /// Build the source and hand it to `compiler`
    pub fn compile<C: ShaderCompiler>(mut self, compiler: &C) -> Result<CompiledScene<C::Program>> {
        let source = self.build_source()?;
        tracing::debug!(
            entry_point = %self.config.entry_point,
            profile = %self.config.profile,
            "Compiling scene shader"
        );
        let program = compiler
            .compile(&source, &self.config)
            .map_err(|e| Error::Compile(Box::new(e)))?;
        Ok(CompiledScene::new(program, source, self.parameters, self.feeds))
    }

    /// Validate the tree under `root` and mark it `Prepared`
    ///
    /// Returns the handles of every node in the tree.
    fn prepare(&mut self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut occurrences: HashMap<NodeId, usize> = HashMap::new();
        let mut tree = Vec::new();
        let mut pending = vec![root];

        while let Some(id) = pending.pop() {
            let node = self.node(id)?;
            match self.state(id)? {
                NodeState::Unprepared => {}
                NodeState::Prepared => {
                    return Err(Error::State(format!(
                        "{} {id} is already being built",
                        node.kind()
                    )));
                }
                NodeState::Finalized => {
                    return Err(Error::State(format!(
                        "{} {id} was already built into a shader",
                        node.kind()
                    )));
                }
            }

            let count = occurrences.entry(id).or_insert(0);
            *count += 1;
            if *count > 1 {
                return Err(Error::State(format!(
                    "{} {id} appears more than once in the tree",
                    node.kind()
                )));
            }

            let children = node.children();
            if node.is_n_ary() && children.is_empty() {
                return Err(Error::Configuration(format!(
                    "{} {id} has no children",
                    node.kind()
                )));
            }

            tree.push(id);
            pending.extend(children.into_iter().rev());
        }

        self.set_states(&tree, NodeState::Prepared);
        Ok(tree)
    }

    fn set_states(&mut self, ids: &[NodeId], state: NodeState) {
        for id in ids {
            self.states[id.index()] = state;
        }
    }

    /// Bodies of `GetDistance` and `GetHit`
    ///
    /// Helpers are staged and only kept when both passes succeed.
    fn emit_functions(&mut self, root: NodeId) -> Result<(SourceBuilder, SourceBuilder)> {
        let mut global = self.global.clone();
        let mut ctx = EmitContext::new(&self.nodes, &self.registry, &mut global, &mut self.names);

        let mut distance = SourceBuilder::new();
        let expr = ctx.sdf(root, &mut distance)?;
        distance.statement(&format!("return {expr};"));

        let mut hit = SourceBuilder::new();
        let expr = ctx.hit(root, &mut hit)?;
        hit.statement(&format!("return {expr};"));

        self.global = global;
        Ok((distance, hit))
    }

    fn assemble(&self, camera: &str, distance: &SourceBuilder, hit: &SourceBuilder) -> String {
        let config = &self.config;
        let mut out = SourceBuilder::new();

        out.append_line(&format!("#include \"{}\"", config.space_include))
            .newline();

        out.append_line(&format!(
            "cbuffer {} : register(b{})",
            config.cbuffer_name, config.cbuffer_register
        ))
        .append_line("{")
        .append_builder(self.cbuffer.source())
        .append_line("}")
        .newline();

        if !self.global.is_empty() {
            out.append_builder(self.global.source()).newline();
        }

        out.append_line("float GetDistance(Pos p)")
            .append_line("{")
            .append_builder(distance)
            .append_line("}")
            .newline();

        out.append_line("HitResult GetHit(Pos p)")
            .append_line("{")
            .append_builder(hit)
            .append_line("}")
            .newline();

        out.append_line("Transform GetTransform()")
            .append_line("{")
            .statement(&format!("return {camera};"))
            .append_line("}")
            .newline();

        for include in config.trailing_includes() {
            out.append_line(&format!("#include \"{include}\""));
        }

        out.into_string()
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl std::fmt::Debug for SceneBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneBuilder")
            .field("config", &self.config)
            .field("nodes", &self.nodes.len())
            .field("root", &self.root)
            .field("camera_transform", &self.camera_transform)
            .field("parameters", &self.parameters)
            .field("feeds", &self.feeds.len())
            .finish_non_exhaustive()
    }
}

fn unknown_node(id: NodeId) -> Error {
    Error::Lookup(format!("node {id} is not part of this scene"))
}
