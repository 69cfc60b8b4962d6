//! Plain-data components attached to host entities.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::material::Material;
use crate::model::{Model, ModelMesh, SubMesh};

/// Model assignment of an entity.
#[derive(Clone, Debug)]
pub struct ModelComponent {
    pub model: Arc<Model>,
    pub skin: u32,
    /// Per-entity replacements by material index.
    pub material_overrides: HashMap<usize, Arc<Material>>,
    /// Selected alternative per body group.
    pub body_groups: Vec<u32>,
}

impl ModelComponent {
    pub fn new(model: Arc<Model>) -> Self {
        Self {
            model,
            skin: 0,
            material_overrides: HashMap::new(),
            body_groups: Vec::new(),
        }
    }

    pub fn has_material_overrides(&self) -> bool {
        !self.material_overrides.is_empty()
    }

    /// Material actually rendered for `index`, honoring overrides.
    pub fn render_material(&self, index: usize) -> Option<&Arc<Material>> {
        self.material_overrides
            .get(&index)
            .or_else(|| self.model.material(index))
    }

    /// Rendered material of a sub-mesh under `skin`.
    pub fn material_for(&self, sub_mesh: &SubMesh, skin: u32) -> Option<&Arc<Material>> {
        let index = self.model.material_index(sub_mesh, skin)?;
        self.render_material(index)
    }
}

/// Render pass an entity is drawn in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderLayer {
    #[default]
    World,
    /// Part of the 3D skybox.
    Skybox,
    /// First-person view models.
    View,
    None,
}

/// Render state of an entity.
#[derive(Clone, Debug, Default)]
pub struct RenderComponent {
    pub layer: RenderLayer,
    /// Level-of-detail mesh list currently selected by the host.
    pub lod_meshes: Vec<Arc<ModelMesh>>,
    /// Local-space render bounds `(min, max)`.
    pub render_bounds: (Vec3, Vec3),
    pub exempt_from_occlusion_culling: bool,
    pub hidden: bool,
    /// Maximum distance from the camera at which the entity is drawn.
    pub max_draw_distance: Option<f32>,
}

impl RenderComponent {
    pub fn should_draw(&self, origin: Vec3, cam_pos: Vec3) -> bool {
        !self.hidden
            && self
                .max_draw_distance
                .is_none_or(|max| origin.distance(cam_pos) <= max)
    }
}

/// Per-vertex deformation sampled from an animated component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexTransform {
    /// Skinning and morph matrix for the vertex.
    pub matrix: Mat4,
    /// Additional morph delta added to normal and tangent.
    pub normal_offset: Vec3,
    /// Wrinkle blend factor.
    pub wrinkle: f32,
}

/// Light source kinds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Cone light. Cutoffs are half-angles in degrees.
    Spot {
        inner_cutoff_deg: f32,
        outer_cutoff_deg: f32,
    },
    Point,
    Directional,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightComponent {
    pub kind: LightKind,
    /// Linear RGB color.
    pub color: Vec3,
    /// Intensity in candela (spot/point) or lux (directional).
    pub intensity: f32,
    /// Luminous power in lumen, used for spot and point lights.
    pub intensity_lumen: f32,
    pub turned_on: bool,
}

/// A 3D-skybox camera: the sky area around `origin` is drawn `scale` times
/// larger around the main camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyCamera {
    pub origin: Vec3,
    pub scale: f32,
}

/// How a particle system blends into the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParticleAlphaMode {
    #[default]
    Translucent,
    Additive,
    AdditiveByColor,
    Opaque,
}

/// A live particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Half the quad's edge length.
    pub radius: f32,
    /// Roll around the view axis, in radians.
    pub rotation: f32,
    /// RGBA, 0..=255.
    pub color: [u8; 4],
}
