#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use lumen_host::{
    DirectoryFs, HostTexture, ImageData, Material, Model, ModelMesh, SubMesh, TextureLibrary,
    TextureRef, Vertex, slots,
};
use lumen_scene::{
    FinalizedScene, HostServices, JobControl, RenderError, RenderOutput, Renderer,
};
use lumen_texture::{DdsProbe, ImageFileWriter};

/// An asset root with a handful of native textures.
pub struct Assets {
    pub root: tempfile::TempDir,
    pub fs: DirectoryFs,
    pub textures: TextureLibrary,
    pub writer: ImageFileWriter,
    pub probe: DdsProbe,
}

impl Assets {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let fs = DirectoryFs::new([root.path().to_path_buf()]);
        let writer = ImageFileWriter::new(root.path(), "dds");
        let assets = Self {
            root,
            fs,
            textures: TextureLibrary::new(),
            writer,
            probe: DdsProbe,
        };
        for name in [
            "error",
            "white",
            "wood",
            "wood_normal",
            "wood_rma",
            "stone",
            "sky_equirect",
        ] {
            assets.touch(name);
        }
        assets
    }

    pub fn touch(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"DDS \x7c\x00\x00\x00").unwrap();
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(format!("materials/{name}.dds"))
    }

    pub fn services(&self) -> HostServices<'_> {
        HostServices {
            fs: &self.fs,
            textures: &self.textures,
            writer: &self.writer,
            probe: &self.probe,
        }
    }
}

pub fn texture(name: &str) -> TextureRef {
    TextureRef::new(
        name,
        Arc::new(HostTexture::flat(name, ImageData::solid(2, 2, [1.0; 4]))),
    )
}

pub fn cubemap(name: &str) -> TextureRef {
    let face = || ImageData::solid(2, 2, [0.5, 0.6, 0.9, 1.0]);
    TextureRef::new(
        name,
        Arc::new(HostTexture::cubemap(
            name,
            [face(), face(), face(), face(), face(), face()],
        )),
    )
}

pub fn pbr(name: &str, albedo: &str) -> Arc<Material> {
    Arc::new(
        Material::new(name, "pbr")
            .with_texture(slots::ALBEDO_MAP, texture(albedo))
            .with_texture(slots::NORMAL_MAP, texture("wood_normal"))
            .with_texture(slots::RMA_MAP, texture("wood_rma")),
    )
}

pub fn skybox_material() -> Arc<Material> {
    Arc::new(Material::new("sky", "skybox").with_texture(slots::SKYBOX, cubemap("sky")))
}

/// Unit quad in the XY plane using material slot `slot`.
pub fn quad(slot: u32) -> Arc<SubMesh> {
    let v = |x: f32, y: f32| Vertex::new(Vec3::new(x, y, 0.0), Vec3::Z, Vec3::X, Vec2::new(x, y));
    Arc::new(SubMesh {
        vertices: vec![v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)],
        triangles: vec![0, 1, 2, 0, 2, 3],
        skin_texture_index: slot,
        ..SubMesh::default()
    })
}

/// A single-group model with one quad per material slot.
pub fn model(name: &str, materials: Vec<Arc<Material>>) -> Arc<Model> {
    let sub_meshes = (0..materials.len() as u32).map(quad).collect();
    model_with(name, materials, sub_meshes)
}

pub fn model_with(name: &str, materials: Vec<Arc<Material>>, sub_meshes: Vec<Arc<SubMesh>>) -> Arc<Model> {
    Arc::new(Model {
        name: name.to_string(),
        mesh_groups: vec![vec![Arc::new(ModelMesh {
            reference_id: None,
            sub_meshes,
        })]],
        base_mesh_groups: vec![0],
        materials,
        ..Model::default()
    })
}

/// Renderer that reports scene statistics through the image size.
pub struct CountingRenderer;

impl Renderer for CountingRenderer {
    fn render(&self, scene: &FinalizedScene, control: &JobControl) -> Result<RenderOutput, RenderError> {
        control.check()?;
        let triangles: usize = scene.meshes.iter().map(|m| m.triangle_count()).sum();
        Ok(RenderOutput {
            image: ImageData::solid(scene.objects.len() as u32, triangles as u32, [0.0; 4]),
        })
    }
}
