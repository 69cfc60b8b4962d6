//! Enums shared by every stage of a scene build.

use serde::{Deserialize, Serialize};

/// What the renderer is asked to produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum RenderMode {
    /// Full path-traced image of the scene.
    #[default]
    RenderImage,
    /// Ambient occlusion baked onto a bake target.
    BakeAmbientOcclusion,
    /// Normals baked onto a bake target.
    BakeNormals,
    /// Diffuse lighting baked into lightmap UV space.
    BakeDiffuseLighting,
    /// Albedo pass of the scene.
    SceneAlbedo,
    /// Normal pass of the scene.
    SceneNormals,
    /// Depth pass of the scene.
    SceneDepth,
}

impl RenderMode {
    /// Returns `true` for modes that render the scene as seen through the
    /// camera (as opposed to baking onto a target surface).
    ///
    /// Only these modes sample the animated pose of entities.
    pub fn is_render_scene_mode(self) -> bool {
        matches!(
            self,
            Self::RenderImage | Self::SceneAlbedo | Self::SceneNormals | Self::SceneDepth
        )
    }

    /// Returns `true` for the three baking modes.
    pub fn is_bake_mode(self) -> bool {
        !self.is_render_scene_mode()
    }
}

/// Device the renderer should execute on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum DeviceType {
    /// CPU rendering.
    Cpu,
    /// GPU rendering.
    #[default]
    Gpu,
}

/// Global shading style used for full renders and lighting bakes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum ShaderStyle {
    /// Physically based shading.
    #[default]
    Pbr,
    /// Cel/toon shading.
    Toon,
}
