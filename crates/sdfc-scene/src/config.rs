//! Shader assembly settings
//!
//! The generated source is sandwiched between includes supplied by the
//! ray-marching runtime. Which space and renderer are included decides whether
//! `Pos` is a Euclidean `float3` or a hyperboloid `float4`.

use serde::{Deserialize, Serialize};

/// Geometry the runtime includes are written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Space {
    #[default]
    Euclidean,
    Hyperbolic,
}

/// Settings for assembling and compiling a scene shader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Include defining `Pos`, `Transform` and `HitResult`
    pub space_include: String,
    /// Lighting/shading include, placed after the ray-marching core
    pub renderer_include: String,
    /// Ray-marching core include
    pub core_include: String,
    /// Include providing the compute entry point
    pub main_include: String,
    /// Name of the scene parameter constant buffer
    pub cbuffer_name: String,
    /// Register slot of the scene parameter constant buffer (`bN`)
    pub cbuffer_register: u32,
    /// Entry point handed to the shader compiler
    pub entry_point: String,
    /// Shader profile handed to the shader compiler
    pub profile: String,
}

impl SceneConfig {
    /// Settings for flat space
    pub fn euclidean() -> Self {
        Self::for_space(Space::Euclidean)
    }

    /// Settings for the hyperboloid model
    pub fn hyperbolic() -> Self {
        Self::for_space(Space::Hyperbolic)
    }

    /// Default settings for a geometry
    pub fn for_space(space: Space) -> Self {
        let (space_include, renderer_include) = match space {
            Space::Euclidean => ("Spaces/Euclidean.hlsl", "Renderers/EuclideanLit.hlsl"),
            Space::Hyperbolic => ("Spaces/Hyperbolic.hlsl", "Renderers/HyperbolicLit.hlsl"),
        };

        Self {
            space_include: space_include.to_string(),
            renderer_include: renderer_include.to_string(),
            core_include: "RayMarchingCore.hlsl".to_string(),
            main_include: "RayMarchingMain.hlsl".to_string(),
            cbuffer_name: "SceneParams".to_string(),
            cbuffer_register: 0,
            entry_point: "CSMain".to_string(),
            profile: "cs_5_0".to_string(),
        }
    }

    /// Includes that follow the scene functions, in order
    pub fn trailing_includes(&self) -> [&str; 3] {
        [
            self.core_include.as_str(),
            self.renderer_include.as_str(),
            self.main_include.as_str(),
        ]
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::euclidean()
    }
}
