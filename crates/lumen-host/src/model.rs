//! Model geometry: mesh groups, sub-meshes, skins and body groups.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::material::Material;

/// Primitive topology of a sub-mesh. Only triangles are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GeometryType {
    #[default]
    Triangles,
    Lines,
    Points,
}

/// Bind-pose vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tangent: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            tangent,
            uv,
        }
    }
}

/// A contiguous triangle range sharing one material slot.
#[derive(Clone, Debug, Default)]
pub struct SubMesh {
    pub geometry: GeometryType,
    pub vertices: Vec<Vertex>,
    /// Flat index list, three entries per triangle.
    pub triangles: Vec<u32>,
    /// Per-vertex alpha values (`x` is the blend alpha). May be shorter than
    /// `vertices` or empty.
    pub alphas: Vec<Vec2>,
    /// Extra UV channels by name (`"lightmap"`, ...).
    pub uv_sets: HashMap<String, Vec<Vec2>>,
    /// Material slot, remapped through the active skin.
    pub skin_texture_index: u32,
}

impl SubMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn uv_set(&self, name: &str) -> Option<&[Vec2]> {
        self.uv_sets.get(name).map(Vec::as_slice)
    }
}

/// A group of sub-meshes. `reference_id` is the PVS cluster for world
/// geometry and `None` for everything else.
#[derive(Clone, Debug, Default)]
pub struct ModelMesh {
    pub reference_id: Option<u32>,
    pub sub_meshes: Vec<Arc<SubMesh>>,
}

/// A selectable set of alternatives; each choice names a mesh group.
#[derive(Clone, Debug, Default)]
pub struct BodyGroup {
    pub name: String,
    pub mesh_groups: Vec<u32>,
}

/// Static eyeball parameters of a model.
#[derive(Clone, Debug, Default)]
pub struct Eyeball {
    pub name: String,
    pub max_dilation_factor: f32,
    pub iris_uv_radius: f32,
}

/// A host model.
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub name: String,
    /// Level-0 meshes per mesh group.
    pub mesh_groups: Vec<Vec<Arc<ModelMesh>>>,
    /// Mesh groups that are always included.
    pub base_mesh_groups: Vec<u32>,
    pub body_groups: Vec<BodyGroup>,
    pub materials: Vec<Arc<Material>>,
    /// Skin index -> (material slot -> material index). Skin 0 is the default.
    pub skins: Vec<Vec<u32>>,
    pub eyeballs: Vec<Eyeball>,
    pub has_vertex_animations: bool,
}

impl Model {
    /// Resolve a sub-mesh's material index under `skin`.
    ///
    /// Unknown skins fall back to skin 0. Without any skin table the slot is
    /// the material index.
    pub fn material_index(&self, sub_mesh: &SubMesh, skin: u32) -> Option<usize> {
        let slot = sub_mesh.skin_texture_index as usize;
        let index = if self.skins.is_empty() {
            slot
        } else {
            let table = self
                .skins
                .get(skin as usize)
                .or_else(|| self.skins.first())?;
            *table.get(slot)? as usize
        };
        (index < self.materials.len()).then_some(index)
    }

    pub fn material(&self, index: usize) -> Option<&Arc<Material>> {
        self.materials.get(index)
    }

    pub fn eyeball(&self, index: usize) -> Option<&Eyeball> {
        self.eyeballs.get(index)
    }

    /// One choice per body group, 0 where `selection` leaves it unspecified.
    pub fn resolve_body_groups(&self, selection: &[u32]) -> Vec<u32> {
        (0..self.body_groups.len())
            .map(|i| selection.get(i).copied().unwrap_or(0))
            .collect()
    }

    /// Meshes for a body-group selection: base groups first, then the chosen
    /// alternative of every body group (choice 0 when unspecified).
    pub fn body_group_meshes(&self, selection: &[u32]) -> Vec<Arc<ModelMesh>> {
        let mut groups: Vec<u32> = self.base_mesh_groups.clone();
        for (body_group, choice) in self.body_groups.iter().zip(self.resolve_body_groups(selection)) {
            if let Some(group) = body_group.mesh_groups.get(choice as usize) {
                groups.push(*group);
            }
        }
        groups
            .into_iter()
            .filter_map(|g| self.mesh_groups.get(g as usize))
            .flat_map(|meshes| meshes.iter().cloned())
            .collect()
    }

    pub fn sub_mesh_count(&self) -> usize {
        self.mesh_groups
            .iter()
            .flatten()
            .map(|mesh| mesh.sub_meshes.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_mesh(slot: u32) -> Arc<SubMesh> {
        Arc::new(SubMesh {
            skin_texture_index: slot,
            ..SubMesh::default()
        })
    }

    fn model_with_materials(count: usize) -> Model {
        Model {
            name: "m".into(),
            materials: (0..count)
                .map(|i| Arc::new(Material::new(format!("mat{i}"), "pbr")))
                .collect(),
            ..Model::default()
        }
    }

    #[test]
    fn test_material_index_without_skins() {
        let model = model_with_materials(2);
        assert_eq!(model.material_index(&sub_mesh(1), 0), Some(1));
        assert_eq!(model.material_index(&sub_mesh(2), 0), None);
    }

    #[test]
    fn test_material_index_remapped_by_skin() {
        let mut model = model_with_materials(3);
        model.skins = vec![vec![0, 1], vec![2, 1]];
        assert_eq!(model.material_index(&sub_mesh(0), 0), Some(0));
        assert_eq!(model.material_index(&sub_mesh(0), 1), Some(2));
        // Unknown skin falls back to the default table.
        assert_eq!(model.material_index(&sub_mesh(0), 7), Some(0));
        assert_eq!(model.material_index(&sub_mesh(5), 1), None);
    }

    #[test]
    fn test_body_group_meshes() {
        let mesh = |id: u32| {
            Arc::new(ModelMesh {
                reference_id: Some(id),
                sub_meshes: vec![sub_mesh(0)],
            })
        };
        let model = Model {
            mesh_groups: vec![vec![mesh(0)], vec![mesh(1)], vec![mesh(2)]],
            base_mesh_groups: vec![0],
            body_groups: vec![BodyGroup {
                name: "head".into(),
                mesh_groups: vec![1, 2],
            }],
            ..Model::default()
        };

        let ids = |sel: &[u32]| -> Vec<Option<u32>> {
            model
                .body_group_meshes(sel)
                .iter()
                .map(|m| m.reference_id)
                .collect()
        };
        assert_eq!(ids(&[]), vec![Some(0), Some(1)]);
        assert_eq!(ids(&[1]), vec![Some(0), Some(2)]);
        assert_eq!(model.resolve_body_groups(&[]), vec![0]);
        assert_eq!(model.resolve_body_groups(&[1, 4]), vec![1]);
        assert_eq!(model.sub_mesh_count(), 3);
    }

    #[test]
    fn test_triangle_count() {
        let sm = SubMesh {
            triangles: vec![0, 1, 2, 2, 1, 3],
            ..SubMesh::default()
        };
        assert_eq!(sm.triangle_count(), 2);
    }
}
