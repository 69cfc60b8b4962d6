//! Capability traits over host entities.
//!
//! Every optional component is reached through an accessor returning
//! `Option`, so callers branch on presence instead of probing a component
//! registry.

use std::sync::Arc;

use glam::Vec4;

use crate::component::{
    LightComponent, ModelComponent, Particle, ParticleAlphaMode, RenderComponent, SkyCamera,
    VertexTransform,
};
use crate::material::Material;
use crate::model::{Model, SubMesh};
use crate::pose::Pose;

/// Skeletal and morph animation state.
pub trait AnimatedComponent {
    /// Index of the playing animation, `None` when in bind pose.
    fn active_animation(&self) -> Option<u32>;

    /// Deformation of one vertex of `sub_mesh` in the current pose.
    fn vertex_transform(&self, sub_mesh: &SubMesh, vertex_index: usize)
    -> Option<VertexTransform>;
}

/// Eye rig state.
pub trait EyeComponent {
    /// Eyeball driven by the material slot `skin_texture_index`.
    fn find_eyeball_index(&self, skin_texture_index: u32) -> Option<usize>;

    /// Current pupil dilation of an eyeball.
    fn dilation(&self, eyeball: usize) -> Option<f32>;

    /// Iris projection vectors `(u, v)` of an eyeball.
    fn projection_vectors(&self, eyeball: usize) -> Option<(Vec4, Vec4)>;
}

/// A running particle system.
pub trait ParticleSystem {
    fn name(&self) -> &str;
    fn material(&self) -> Option<&Arc<Material>>;
    fn alpha_mode(&self) -> ParticleAlphaMode;
    /// Currently alive particles.
    fn particles(&self) -> &[Particle];
}

/// In-memory particle system.
#[derive(Clone, Debug, Default)]
pub struct ParticleSystemData {
    pub name: String,
    pub material: Option<Arc<Material>>,
    pub alpha_mode: ParticleAlphaMode,
    pub particles: Vec<Particle>,
}

impl ParticleSystem for ParticleSystemData {
    fn name(&self) -> &str {
        &self.name
    }

    fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    fn alpha_mode(&self) -> ParticleAlphaMode {
        self.alpha_mode
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

/// A host entity, queried by capability.
pub trait Entity {
    fn local_index(&self) -> u32;
    fn pose(&self) -> Pose;

    /// `true` for the world geometry entity.
    fn is_world(&self) -> bool {
        false
    }

    fn model_component(&self) -> Option<&ModelComponent> {
        None
    }

    fn animated(&self) -> Option<&dyn AnimatedComponent> {
        None
    }

    fn render_component(&self) -> Option<&RenderComponent> {
        None
    }

    fn eye(&self) -> Option<&dyn EyeComponent> {
        None
    }

    /// `true` for sky-dome entities.
    fn is_skybox(&self) -> bool {
        false
    }

    /// `true` when the entity carries lightmap data and can be a bake target.
    fn has_lightmap(&self) -> bool {
        false
    }

    fn light(&self) -> Option<&LightComponent> {
        None
    }

    fn particle_system(&self) -> Option<&dyn ParticleSystem> {
        None
    }

    fn sky_camera(&self) -> Option<&SkyCamera> {
        None
    }

    fn model(&self) -> Option<&Arc<Model>> {
        self.model_component().map(|c| &c.model)
    }
}

/// In-memory entity.
#[derive(Default)]
pub struct EntityData {
    pub local_index: u32,
    pub pose: Pose,
    pub world: bool,
    pub skybox: bool,
    pub lightmap: bool,
    pub model: Option<ModelComponent>,
    pub render: Option<RenderComponent>,
    pub animated: Option<Box<dyn AnimatedComponent>>,
    pub eye: Option<Box<dyn EyeComponent>>,
    pub light: Option<LightComponent>,
    pub particles: Option<Box<dyn ParticleSystem>>,
    pub sky_camera: Option<SkyCamera>,
}

impl EntityData {
    /// An entity showing `model` at `pose`.
    pub fn with_model(local_index: u32, model: Arc<Model>, pose: Pose) -> Self {
        Self {
            local_index,
            pose,
            model: Some(ModelComponent::new(model)),
            ..Self::default()
        }
    }
}

impl Entity for EntityData {
    fn local_index(&self) -> u32 {
        self.local_index
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn is_world(&self) -> bool {
        self.world
    }

    fn model_component(&self) -> Option<&ModelComponent> {
        self.model.as_ref()
    }

    fn animated(&self) -> Option<&dyn AnimatedComponent> {
        self.animated.as_deref()
    }

    fn render_component(&self) -> Option<&RenderComponent> {
        self.render.as_ref()
    }

    fn eye(&self) -> Option<&dyn EyeComponent> {
        self.eye.as_deref()
    }

    fn is_skybox(&self) -> bool {
        self.skybox
    }

    fn has_lightmap(&self) -> bool {
        self.lightmap
    }

    fn light(&self) -> Option<&LightComponent> {
        self.light.as_ref()
    }

    fn particle_system(&self) -> Option<&dyn ParticleSystem> {
        self.particles.as_deref()
    }

    fn sky_camera(&self) -> Option<&SkyCamera> {
        self.sky_camera.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Idle;

    impl AnimatedComponent for Idle {
        fn active_animation(&self) -> Option<u32> {
            None
        }

        fn vertex_transform(&self, _: &SubMesh, _: usize) -> Option<VertexTransform> {
            None
        }
    }

    #[test]
    fn test_default_entity_has_no_capabilities() {
        let ent = EntityData::default();
        assert!(ent.model().is_none());
        assert!(ent.animated().is_none());
        assert!(ent.eye().is_none());
        assert!(ent.particle_system().is_none());
        assert!(!ent.is_world());
        assert!(!ent.has_lightmap());
    }

    #[test]
    fn test_capabilities_are_exposed() {
        let mut ent = EntityData::with_model(3, Arc::new(Model::default()), Pose::IDENTITY);
        ent.animated = Some(Box::new(Idle));
        assert_eq!(ent.local_index(), 3);
        assert!(ent.model().is_some());
        assert_eq!(ent.animated().unwrap().active_animation(), None);
    }
}
