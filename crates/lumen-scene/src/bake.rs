//! Bake target setup.
//!
//! A bake renders onto exactly one registered object. Everything else in
//! the scene only contributes occlusion and bounce light.

use std::sync::Arc;

use glam::{Quat, Vec2, Vec3};
use lumen_host::{Entity, Model, Pose, SubMesh};
use tracing::{info, warn};

use crate::scene::{EntityPlacement, MeshSource, ObjectId, Scene};

/// UV set holding the lightmap layout of a sub-mesh.
pub const LIGHTMAP_UV_SET: &str = "lightmap";

/// Per-corner lightmap UVs of `sub_meshes`, three per triangle, zero where a
/// sub-mesh has no lightmap layout.
pub fn lightmap_uvs(sub_meshes: &[Arc<SubMesh>]) -> Vec<Vec2> {
    let mut uvs = Vec::new();
    for sub_mesh in sub_meshes {
        let layout = sub_mesh.uv_set(LIGHTMAP_UV_SET);
        let corners = sub_mesh.triangle_count() * 3;
        uvs.extend(sub_mesh.triangles[..corners].iter().map(|&i| {
            layout
                .and_then(|uvs| uvs.get(i as usize))
                .copied()
                .unwrap_or(Vec2::ZERO)
        }));
    }
    uvs
}

impl Scene<'_> {
    /// Splits `model` into the sub-meshes using `material_index` (the bake
    /// target) and everything else (the environment).
    ///
    /// The target is published and registered first, so its object always
    /// precedes the environment. Returns `None` when the material covers no
    /// triangles.
    pub fn set_ao_bake_target(&mut self, model: &Model, material_index: usize) -> Option<ObjectId> {
        let source = MeshSource::model(model, 0);
        let mut targets = Vec::new();
        let mut environment = Vec::new();
        {
            // Rejects everything; it only sorts sub-meshes while add_model
            // walks them with body groups and geometry rules applied.
            let mut partition = |sub_mesh: &Arc<SubMesh>, _: Vec3, _: Quat| {
                if model.material_index(sub_mesh, 0) == Some(material_index) {
                    targets.push(sub_mesh.clone());
                } else {
                    environment.push(sub_mesh.clone());
                }
                false
            };
            self.add_model(&source, "ao_mesh", None, Some(&mut partition));
        }

        let Some(target) = self.assemble(&source, targets, "ao_target") else {
            warn!(
                "Material {material_index} of model '{}' has no triangles to bake onto",
                model.name
            );
            return None;
        };
        let mesh = self.add_mesh(target.buffer);
        let object = self.add_object(mesh, Pose::IDENTITY);
        self.set_bake_target(object);

        if let Some(env) = self.assemble(&source, environment, "ao_mesh") {
            let mesh = self.add_mesh(env.buffer);
            self.add_object(mesh, Pose::IDENTITY);
        }
        info!(
            "Ambient occlusion bake target: material {material_index} of '{}'",
            model.name
        );
        Some(object)
    }

    /// Registers `entity` as the lightmap bake target, writing its lightmap
    /// UVs onto a freshly built, uncached mesh.
    pub fn set_lightmap_bake_target(&mut self, entity: &dyn Entity) -> Option<ObjectId> {
        if !entity.has_lightmap() {
            warn!(
                "Entity {} has no lightmap data and cannot be a bake target",
                entity.local_index()
            );
            return None;
        }

        let mut sub_meshes = Vec::new();
        let placement = EntityPlacement {
            pose: entity.pose(),
            name_suffix: "",
            use_cache: false,
        };
        let object = self.place_entity(entity, placement, Some(&mut sub_meshes), None, None)?;
        let mesh = self.object(object)?.mesh;

        let uvs = lightmap_uvs(&sub_meshes);
        let buffer = self.mesh_mut(mesh)?;
        if let Err(e) = buffer.set_lightmap_uvs(uvs) {
            warn!("Unable to apply lightmap UVs to '{}': {e}", buffer.name);
            return None;
        }
        self.set_bake_target(object);
        info!("Lightmap bake target: entity {}", entity.local_index());
        Some(object)
    }
}
