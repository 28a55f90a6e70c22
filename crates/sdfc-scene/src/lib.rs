//! sdfc scene - CSG scene graphs compiled to HLSL ray-marching shaders
//!
//! A scene is a graph of signed-distance nodes (primitives, combinators,
//! transforms) built with [`SceneBuilder`]. Building the scene emits one
//! HLSL translation unit with a distance function, a hit function, the
//! camera accessor and a constant buffer holding every value that changes
//! at runtime. Compiling and dispatching that source is left to a
//! [`ShaderCompiler`] supplied by the caller.
//!
//! ## Key Types
//!
//! - [`SceneBuilder`] - Owns the node arena, parameters and generated source
//! - [`Node`] - The closed set of scene nodes, Euclidean and hyperbolic
//! - [`Expression`] - A node input: literal, per-frame dynamic or raw code
//! - [`ConstantBlock`] - CPU-side constant buffer with HLSL packing
//! - [`CpuScene`] - Evaluates a scene on the CPU, mirroring the shader
//!
//! ## Example
//!
//! ```rust
//! use sdfc_scene::glam::{Mat4, Vec3, Vec4};
//! use sdfc_scene::{Node, SceneBuilder};
//!
//! let mut scene = SceneBuilder::default();
//! scene.define_camera_transform::<Mat4>("camTransform")?;
//!
//! let a = scene.add(Node::sphere(1.0_f32, Vec3::ZERO, Vec4::ONE));
//! let b = scene.add(Node::sphere(0.5_f32, Vec3::X, Vec4::new(1.0, 0.0, 0.0, 1.0)));
//! let root = scene.add(Node::union([a, b]));
//! scene.set_root(root);
//!
//! let source = scene.build_source()?;
//! assert!(source.contains("float GetDistance(Pos p)"));
//! # Ok::<(), sdfc_scene::Error>(())
//! ```

pub mod compile;
pub mod config;
pub mod emit;
mod error;
pub mod eval;
pub mod expression;
pub mod node;
pub mod params;
pub mod scene;
pub mod source;
pub mod tiling;
pub mod types;

pub use compile::{CompiledScene, ShaderCompiler};
pub use config::{SceneConfig, Space};
pub use error::{Error, Result};
pub use eval::{CpuScene, HitRecord};
pub use expression::{Dynamic, Expression};
pub use node::{Node, NodeId, NodeState};
pub use params::{ConstantBlock, MemberLayout, Parameter, ParameterFeed, ParameterSink};
pub use scene::SceneBuilder;
pub use source::{MarkedSegment, SourceBuilder};
pub use types::{TypeDescriptor, TypeRegistry};

pub use glam;
