//! Host-wide services: entity iteration, visibility, textures and files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec3;

use crate::entity::{Entity, EntityData};
use crate::texture::HostTexture;

/// Leaf of the host's visibility tree containing a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisLeaf {
    pub cluster: u32,
    /// Bounds of everything potentially visible from this leaf.
    pub min_visible: Vec3,
    pub max_visible: Vec3,
}

/// Precomputed potentially-visible-set structure of the world.
pub trait VisibilityTree {
    fn find_leaf(&self, position: Vec3) -> Option<VisLeaf>;
    fn is_cluster_visible(&self, from: u32, to: u32) -> bool;
}

/// The host's scene.
pub trait HostWorld {
    fn entities(&self) -> Vec<&dyn Entity>;

    fn visibility_tree(&self) -> Option<&dyn VisibilityTree> {
        None
    }
}

/// Host texture manager.
pub trait TextureManager {
    /// Load a texture by name, blocking until it is available.
    fn load(&self, name: &str) -> Option<Arc<HostTexture>>;

    /// Block until every pending texture load has finished.
    fn wait_for_textures(&self);
}

/// Host asset file system.
pub trait AssetFs {
    /// Absolute path of an existing file given its asset-relative path.
    fn find_absolute_path(&self, relative: &Path) -> Option<PathBuf>;
}

/// In-memory world.
#[derive(Default)]
pub struct WorldData {
    pub entities: Vec<EntityData>,
    pub visibility: Option<Box<dyn VisibilityTree>>,
}

impl HostWorld for WorldData {
    fn entities(&self) -> Vec<&dyn Entity> {
        self.entities.iter().map(|e| e as &dyn Entity).collect()
    }

    fn visibility_tree(&self) -> Option<&dyn VisibilityTree> {
        self.visibility.as_deref()
    }
}

/// Texture manager over a fixed set of already-loaded textures.
#[derive(Debug, Default)]
pub struct TextureLibrary {
    textures: HashMap<String, Arc<HostTexture>>,
    waits: AtomicUsize,
}

impl TextureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, texture: Arc<HostTexture>) {
        self.textures.insert(texture.name.clone(), texture);
    }

    /// Number of times the load barrier was hit.
    pub fn wait_count(&self) -> usize {
        self.waits.load(Ordering::Relaxed)
    }
}

impl TextureManager for TextureLibrary {
    fn load(&self, name: &str) -> Option<Arc<HostTexture>> {
        self.textures.get(name).cloned()
    }

    fn wait_for_textures(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }
}

/// Asset file system over an ordered list of root directories. Earlier roots
/// shadow later ones.
#[derive(Clone, Debug, Default)]
pub struct DirectoryFs {
    roots: Vec<PathBuf>,
}

impl DirectoryFs {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl AssetFs for DirectoryFs {
    fn find_absolute_path(&self, relative: &Path) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::ImageData;

    #[test]
    fn test_directory_fs_search_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(second.path().join("materials")).unwrap();
        std::fs::write(second.path().join("materials/a.dds"), b"DDS ").unwrap();

        let fs = DirectoryFs::new([first.path().to_path_buf(), second.path().to_path_buf()]);
        assert_eq!(
            fs.find_absolute_path(Path::new("materials/a.dds")),
            Some(second.path().join("materials/a.dds"))
        );
        assert_eq!(fs.find_absolute_path(Path::new("materials/b.dds")), None);

        std::fs::create_dir_all(first.path().join("materials")).unwrap();
        std::fs::write(first.path().join("materials/a.dds"), b"DDS ").unwrap();
        assert_eq!(
            fs.find_absolute_path(Path::new("materials/a.dds")),
            Some(first.path().join("materials/a.dds"))
        );
    }

    #[test]
    fn test_directory_fs_ignores_directories() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("materials")).unwrap();
        let fs = DirectoryFs::new([root.path().to_path_buf()]);
        assert_eq!(fs.find_absolute_path(Path::new("materials")), None);
    }

    #[test]
    fn test_texture_library_load_and_wait() {
        let mut lib = TextureLibrary::new();
        lib.insert(Arc::new(HostTexture::flat(
            "white",
            ImageData::solid(1, 1, [1.0; 4]),
        )));
        assert!(lib.load("white").is_some());
        assert!(lib.load("black").is_none());

        lib.wait_for_textures();
        lib.wait_for_textures();
        assert_eq!(lib.wait_count(), 2);
    }

    #[test]
    fn test_world_data_iterates_entities() {
        let world = WorldData {
            entities: vec![EntityData::default(), EntityData::default()],
            visibility: None,
        };
        assert_eq!(world.entities().len(), 2);
        assert!(world.visibility_tree().is_none());
    }
}
