use std::collections::HashMap;

use crate::scene::MeshId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelCacheEntry {
    pub mesh: MeshId,
    pub skin: u32,
    /// Resolved choice per body group the mesh was assembled with.
    pub body_groups: Vec<u32>,
}

/// Meshes of unanimated, non-overridden models, keyed by model name.
///
/// Append-only while a scene is built.
#[derive(Debug, Default)]
pub struct ModelCache {
    entries: HashMap<String, Vec<ModelCacheEntry>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, model: &str, skin: u32, body_groups: &[u32]) -> Option<MeshId> {
        self.entries
            .get(model)?
            .iter()
            .find(|e| e.skin == skin && e.body_groups == body_groups)
            .map(|e| e.mesh)
    }

    pub fn insert(&mut self, model: &str, skin: u32, body_groups: Vec<u32>, mesh: MeshId) {
        self.entries
            .entry(model.to_string())
            .or_default()
            .push(ModelCacheEntry {
                mesh,
                skin,
                body_groups,
            });
    }

    /// Number of cached meshes.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
