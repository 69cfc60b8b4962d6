//! The scene under construction: mesh arena, object instances, lights,
//! camera and global settings.

use std::path::PathBuf;
use std::sync::Arc;

use glam::{Quat, Vec3};
use lumen_config::{Config, DeviceType, RenderMode, ShaderStyle, TextureConfig};
use lumen_host::{
    AnimatedComponent, AssetFs, Entity, GeometryType, Material, Model, ModelComponent, ModelMesh,
    Pose, SubMesh, TextureManager, slots,
};
use lumen_mesh::{Deformation, MeshBuffer, MeshFlags, append_sub_mesh};
use lumen_shader::{ShaderFactory, ShaderInfo, ShaderInstance, ShaderSettings};
use lumen_texture::{ImageProbe, PrepareFlags, TexturePreparer, TextureWriter};
use tracing::{debug, info, warn};

use crate::cache::ModelCache;
use crate::camera::Camera;
use crate::error::RenderError;
use crate::job::{FinalizedScene, RenderJob, Renderer};
use crate::light::Light;

/// Mesh filter: `(mesh, entity origin, entity rotation) -> keep`.
pub type MeshFilter<'f> = dyn Fn(&ModelMesh, Vec3, Quat) -> bool + 'f;
/// Sub-mesh filter: `(sub-mesh, entity origin, entity rotation) -> keep`.
pub type SubMeshFilter<'f> = dyn FnMut(&Arc<SubMesh>, Vec3, Quat) -> bool + 'f;

/// Index into the scene's mesh arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Index into the scene's object list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// A placed mesh. The pose is a snapshot taken when the object was added.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectInstance {
    pub mesh: MeshId,
    pub pose: Pose,
}

/// Host collaborators a scene build reads through.
#[derive(Clone, Copy)]
pub struct HostServices<'a> {
    pub fs: &'a dyn AssetFs,
    pub textures: &'a dyn TextureManager,
    pub writer: &'a dyn TextureWriter,
    pub probe: &'a dyn ImageProbe,
}

/// Global settings handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSettings {
    pub render_mode: RenderMode,
    pub device: DeviceType,
    pub samples: Option<u32>,
    pub hdr_output: bool,
    pub denoise: bool,
    /// Equirectangular sky image.
    pub sky: Option<PathBuf>,
    /// Pitch, yaw, roll in degrees.
    pub sky_angles: Vec3,
    pub sky_strength: f32,
    pub emission_strength: f32,
    pub max_transparency_bounces: u32,
    pub light_intensity_factor: f32,
    pub motion_blur_strength: f32,
    pub shader_style: ShaderStyle,
    pub particle_light_emission_factor: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SceneSettings {
    /// Settings of a config. The sky override is applied by the caller
    /// after population so it wins over sky entities.
    pub fn from_config(config: &Config) -> Self {
        Self {
            render_mode: config.render.render_mode,
            device: config.render.device,
            samples: config.render.samples,
            hdr_output: config.render.hdr_output,
            denoise: config.render.denoise,
            sky: None,
            sky_angles: Vec3::from(config.sky.angles),
            sky_strength: config.sky.strength,
            emission_strength: config.lighting.emission_strength,
            max_transparency_bounces: config.lighting.max_transparency_bounces,
            light_intensity_factor: config.lighting.light_intensity_factor,
            motion_blur_strength: config.lighting.motion_blur_strength,
            shader_style: config.shading.style,
            particle_light_emission_factor: config.shading.particle_light_emission_factor,
        }
    }
}

/// Model plus the optional entity context its meshes are built for.
#[derive(Clone, Copy)]
pub struct MeshSource<'e> {
    pub model: &'e Model,
    pub entity: Option<&'e dyn Entity>,
    pub skin: u32,
    pub model_component: Option<&'e ModelComponent>,
    pub animated: Option<&'e dyn AnimatedComponent>,
}

impl<'e> MeshSource<'e> {
    /// A bare model, outside of any entity.
    pub fn model(model: &'e Model, skin: u32) -> Self {
        Self {
            model,
            entity: None,
            skin,
            model_component: None,
            animated: None,
        }
    }

    /// The model of `entity`, if it has one.
    pub fn entity(entity: &'e dyn Entity) -> Option<Self> {
        let component = entity.model_component()?;
        Some(Self {
            model: &component.model,
            entity: Some(entity),
            skin: component.skin,
            model_component: Some(component),
            animated: entity.animated(),
        })
    }

    /// Entity position and rotation the filters are called with.
    fn origin(&self) -> (Vec3, Quat) {
        self.entity
            .map(|e| {
                let pose = e.pose();
                (pose.position, pose.rotation)
            })
            .unwrap_or((Vec3::ZERO, Quat::IDENTITY))
    }

    /// Material rendered on `sub_mesh`, honoring entity overrides.
    pub fn material(&self, sub_mesh: &SubMesh) -> Option<&'e Arc<Material>> {
        match self.model_component {
            Some(component) => component.material_for(sub_mesh, self.skin),
            None => self
                .model
                .material_index(sub_mesh, self.skin)
                .and_then(|i| self.model.material(i)),
        }
    }
}

/// An assembled, not yet published mesh and the sub-meshes it contains.
pub struct AssembledMesh {
    pub buffer: MeshBuffer,
    /// Sub-meshes actually appended, in append order.
    pub sub_meshes: Vec<Arc<SubMesh>>,
}

/// A renderer scene being populated from the host.
pub struct Scene<'a> {
    settings: SceneSettings,
    textures: TexturePreparer<'a>,
    camera: Camera,
    meshes: Vec<Arc<MeshBuffer>>,
    objects: Vec<ObjectInstance>,
    lights: Vec<Light>,
    cache: ModelCache,
    bake_target: Option<ObjectId>,
}

impl<'a> Scene<'a> {
    pub fn new(settings: SceneSettings, textures: TextureConfig, host: HostServices<'a>) -> Self {
        Self {
            settings,
            textures: TexturePreparer::new(textures, host.fs, host.textures, host.writer, host.probe),
            camera: Camera::default(),
            meshes: Vec::new(),
            objects: Vec::new(),
            lights: Vec::new(),
            cache: ModelCache::new(),
            bake_target: None,
        }
    }

    /// A scene configured from `config`, with the camera resolution applied.
    pub fn from_config(config: &Config, host: HostServices<'a>) -> Self {
        let mut scene = Self::new(
            SceneSettings::from_config(config),
            config.textures.clone(),
            host,
        );
        scene
            .camera
            .set_resolution(config.render.width, config.render.height);
        scene
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn render_mode(&self) -> RenderMode {
        self.settings.render_mode
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn texture_preparer(&self) -> &TexturePreparer<'a> {
        &self.textures
    }

    pub fn set_sky(&mut self, path: impl Into<PathBuf>) {
        self.settings.sky = Some(path.into());
    }

    pub fn set_sky_angles(&mut self, angles: Vec3) {
        self.settings.sky_angles = angles;
    }

    pub fn set_sky_strength(&mut self, strength: f32) {
        self.settings.sky_strength = strength;
    }

    pub fn set_emission_strength(&mut self, strength: f32) {
        self.settings.emission_strength = strength;
    }

    pub fn set_max_transparency_bounces(&mut self, bounces: u32) {
        self.settings.max_transparency_bounces = bounces;
    }

    pub fn set_light_intensity_factor(&mut self, factor: f32) {
        self.settings.light_intensity_factor = factor;
    }

    pub fn set_motion_blur_strength(&mut self, strength: f32) {
        self.settings.motion_blur_strength = strength;
    }

    pub fn meshes(&self) -> &[Arc<MeshBuffer>] {
        &self.meshes
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Arc<MeshBuffer>> {
        self.meshes.get(id.0)
    }

    pub(crate) fn mesh_mut(&mut self, id: MeshId) -> Option<&mut MeshBuffer> {
        self.meshes.get_mut(id.0).map(Arc::make_mut)
    }

    pub fn objects(&self) -> &[ObjectInstance] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectInstance> {
        self.objects.get(id.0)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    pub fn bake_target(&self) -> Option<ObjectId> {
        self.bake_target
    }

    pub(crate) fn set_bake_target(&mut self, object: ObjectId) {
        self.bake_target = Some(object);
    }

    /// Publishes a mesh into the arena.
    pub fn add_mesh(&mut self, mesh: MeshBuffer) -> MeshId {
        self.meshes.push(Arc::new(mesh));
        MeshId(self.meshes.len() - 1)
    }

    pub fn add_object(&mut self, mesh: MeshId, pose: Pose) -> ObjectId {
        self.objects.push(ObjectInstance { mesh, pose });
        ObjectId(self.objects.len() - 1)
    }

    pub fn shader_settings(&self) -> ShaderSettings {
        ShaderSettings {
            render_mode: self.settings.render_mode,
            far_z: self.camera.far,
            emission_strength: self.settings.emission_strength,
            style: self.settings.shader_style,
            particle_light_emission_factor: self.settings.particle_light_emission_factor,
        }
    }

    pub fn create_shader(
        &self,
        material: &Material,
        mesh_name: &str,
        info: &ShaderInfo<'_>,
    ) -> Option<Arc<ShaderInstance>> {
        ShaderFactory::new(&self.textures, self.shader_settings())
            .create_shader(material, mesh_name, info)
            .map(Arc::new)
    }

    /// Appends one sub-mesh with its own shader. Returns `false` when the
    /// sub-mesh was skipped.
    pub fn add_sub_mesh(
        &self,
        source: &MeshSource<'_>,
        buffer: &mut MeshBuffer,
        sub_mesh: &SubMesh,
    ) -> bool {
        let Some(material) = source.material(sub_mesh) else {
            debug!(
                "No material for sub-mesh of model '{}', skipping",
                source.model.name
            );
            return false;
        };
        let info = ShaderInfo {
            entity: source.entity,
            sub_mesh: Some(sub_mesh),
            particle: None,
        };
        let Some(shader) = self.create_shader(material, &buffer.name, &info) else {
            debug!(
                "Material '{}' produced no shader, skipping sub-mesh",
                material.name
            );
            return false;
        };
        let shader_index = buffer.add_shader(shader);

        // Bakes use the bind pose; only scene renders see the animated pose.
        let deformation = if self.render_mode().is_render_scene_mode() {
            Deformation::Posed(source.animated)
        } else {
            Deformation::BindPose
        };
        match append_sub_mesh(buffer, sub_mesh, shader_index, deformation) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Invalid sub-mesh in model '{}': {e}, skipping",
                    source.model.name
                );
                false
            }
        }
    }

    /// Assembles the eligible triangle sub-meshes of `meshes` into one mesh.
    ///
    /// Returns `None` when nothing with triangles survives the filters or
    /// no sub-mesh could be shaded.
    pub fn add_mesh_list(
        &self,
        source: &MeshSource<'_>,
        meshes: &[Arc<ModelMesh>],
        mesh_name: &str,
        mesh_filter: Option<&MeshFilter<'_>>,
        sub_mesh_filter: Option<&mut SubMeshFilter<'_>>,
    ) -> Option<AssembledMesh> {
        let targets = collect_sub_meshes(source, meshes, mesh_filter, sub_mesh_filter);
        self.assemble(source, targets, mesh_name)
    }

    /// Builds one mesh from an explicit sub-mesh list.
    pub(crate) fn assemble(
        &self,
        source: &MeshSource<'_>,
        targets: Vec<Arc<SubMesh>>,
        mesh_name: &str,
    ) -> Option<AssembledMesh> {
        let vertex_count: usize = targets.iter().map(|s| s.vertex_count()).sum();
        let triangle_count: usize = targets.iter().map(|s| s.triangle_count()).sum();
        if triangle_count == 0 {
            return None;
        }

        let flags = MeshFlags {
            has_alphas: targets.iter().any(|s| !s.alphas.is_empty()),
            // Vertex animations are the only wrinkle source.
            has_wrinkles: source.model.has_vertex_animations,
        };
        let mut buffer = MeshBuffer::new(mesh_name, vertex_count, triangle_count, flags);
        let sub_meshes: Vec<Arc<SubMesh>> = targets
            .into_iter()
            .filter(|s| self.add_sub_mesh(source, &mut buffer, s))
            .collect();
        if buffer.triangle_count() == 0 {
            debug!("Mesh '{mesh_name}' has no shaded triangles");
            return None;
        }
        Some(AssembledMesh { buffer, sub_meshes })
    }

    /// [`add_mesh_list`](Self::add_mesh_list) over the model's body-group
    /// meshes.
    pub fn add_model(
        &self,
        source: &MeshSource<'_>,
        mesh_name: &str,
        mesh_filter: Option<&MeshFilter<'_>>,
        sub_mesh_filter: Option<&mut SubMeshFilter<'_>>,
    ) -> Option<AssembledMesh> {
        let selection = source
            .model_component
            .map(|c| c.body_groups.as_slice())
            .unwrap_or(&[]);
        let meshes = source.model.body_group_meshes(selection);
        self.add_mesh_list(source, &meshes, mesh_name, mesh_filter, sub_mesh_filter)
    }

    /// Adds an entity's model as an object.
    ///
    /// Sky entities set the scene sky instead and return `None`. When given,
    /// `out_target_meshes` receives the sub-meshes of a freshly built mesh.
    pub fn add_entity(
        &mut self,
        entity: &dyn Entity,
        out_target_meshes: Option<&mut Vec<Arc<SubMesh>>>,
        mesh_filter: Option<&MeshFilter<'_>>,
        sub_mesh_filter: Option<&mut SubMeshFilter<'_>>,
        name_suffix: &str,
    ) -> Option<ObjectId> {
        let placement = EntityPlacement {
            pose: entity.pose(),
            name_suffix,
            use_cache: true,
        };
        self.place_entity(entity, placement, out_target_meshes, mesh_filter, sub_mesh_filter)
    }

    pub(crate) fn place_entity(
        &mut self,
        entity: &dyn Entity,
        placement: EntityPlacement<'_>,
        out_target_meshes: Option<&mut Vec<Arc<SubMesh>>>,
        mesh_filter: Option<&MeshFilter<'_>>,
        sub_mesh_filter: Option<&mut SubMeshFilter<'_>>,
    ) -> Option<ObjectId> {
        let source = MeshSource::entity(entity)?;
        if entity.is_skybox() {
            self.apply_sky_entity(&source, mesh_filter, sub_mesh_filter);
            return None;
        }
        let model = source.model;
        let animated = source
            .animated
            .is_some_and(|a| a.active_animation().is_some());
        let lod_meshes = entity
            .render_component()
            .map(|r| r.lod_meshes.as_slice())
            .filter(|m| !m.is_empty());
        let body_groups = model.resolve_body_groups(
            source
                .model_component
                .map(|c| c.body_groups.as_slice())
                .unwrap_or(&[]),
        );
        // Shared meshes must be exactly what assembly would produce for this
        // entity: whole model, no per-entity geometry or eye projection.
        let cacheable = placement.use_cache
            && mesh_filter.is_none()
            && sub_mesh_filter.is_none()
            && lod_meshes.is_none()
            && entity.eye().is_none()
            && !entity.is_world()
            && !source
                .model_component
                .is_some_and(ModelComponent::has_material_overrides)
            && !animated;

        let cached = if cacheable {
            self.cache.find(&model.name, source.skin, &body_groups)
        } else {
            None
        };

        let mesh = match cached {
            Some(mesh) => {
                debug!(
                    "Reusing cached mesh of model '{}' (skin {})",
                    model.name, source.skin
                );
                mesh
            }
            None => {
                let name = format!(
                    "ent{}_{}",
                    placement.name_suffix,
                    entity.local_index()
                );
                let assembled = match lod_meshes {
                    Some(meshes) => {
                        self.add_mesh_list(&source, meshes, &name, mesh_filter, sub_mesh_filter)
                    }
                    None => self.add_model(&source, &name, mesh_filter, sub_mesh_filter),
                }?;

                if let Some(out) = out_target_meshes {
                    out.extend(assembled.sub_meshes.iter().cloned());
                }
                let mesh = self.add_mesh(assembled.buffer);
                if cacheable && !model.name.is_empty() {
                    self.cache.insert(&model.name, source.skin, body_groups, mesh);
                }
                mesh
            }
        };

        // AO and normal bakes work in model space.
        let mode = self.render_mode();
        let pose = if mode.is_render_scene_mode() || mode == RenderMode::BakeDiffuseLighting {
            placement.pose
        } else {
            Pose::IDENTITY
        };
        Some(self.add_object(mesh, pose))
    }

    /// Uses the cubemap of a sky-dome entity as the scene sky.
    fn apply_sky_entity(
        &mut self,
        source: &MeshSource<'_>,
        mesh_filter: Option<&MeshFilter<'_>>,
        sub_mesh_filter: Option<&mut SubMeshFilter<'_>>,
    ) {
        let selection = source
            .model_component
            .map(|c| c.body_groups.as_slice())
            .unwrap_or(&[]);
        let meshes = source.model.body_group_meshes(selection);
        let mut sky = None;
        for sub_mesh in collect_sub_meshes(source, &meshes, mesh_filter, sub_mesh_filter) {
            let Some(material) = source.material(&sub_mesh) else {
                continue;
            };
            if !material.is_shader("skybox") && !material.is_shader("skybox_equirect") {
                continue;
            }
            let Some(cubemap) = material.texture(slots::SKYBOX) else {
                continue;
            };
            // Only cubemaps come back flagged as environment maps.
            let prepared = self
                .textures
                .prepare(Some(cubemap), PrepareFlags::ENV_MAP, None);
            if prepared.env_map
                && let Some(path) = prepared.path
            {
                sky = Some(path);
            }
        }

        match sky {
            Some(path) => {
                info!("Using sky texture '{}'", path.display());
                self.set_sky(path);
            }
            None => warn!(
                "Sky entity of model '{}' has no usable skybox texture",
                source.model.name
            ),
        }
    }

    /// Consumes the scene and starts rendering it on a worker thread.
    pub fn finalize(self, renderer: impl Renderer) -> Result<RenderJob, RenderError> {
        info!(
            "Finalizing scene: {} meshes, {} objects, {} lights",
            self.meshes.len(),
            self.objects.len(),
            self.lights.len()
        );
        RenderJob::spawn(
            FinalizedScene {
                settings: self.settings,
                camera: self.camera,
                meshes: self.meshes,
                objects: self.objects,
                lights: self.lights,
                bake_target: self.bake_target,
            },
            renderer,
        )
    }
}

/// Where and how an entity is placed.
pub(crate) struct EntityPlacement<'s> {
    pub pose: Pose,
    pub name_suffix: &'s str,
    pub use_cache: bool,
}

/// Triangle sub-meshes of `meshes` that pass both filters, in order.
pub(crate) fn collect_sub_meshes(
    source: &MeshSource<'_>,
    meshes: &[Arc<ModelMesh>],
    mesh_filter: Option<&MeshFilter<'_>>,
    mut sub_mesh_filter: Option<&mut SubMeshFilter<'_>>,
) -> Vec<Arc<SubMesh>> {
    let (origin, rotation) = source.origin();
    let mut targets = Vec::new();
    for mesh in meshes {
        if mesh_filter.is_some_and(|f| !f(mesh.as_ref(), origin, rotation)) {
            continue;
        }
        for sub_mesh in &mesh.sub_meshes {
            if sub_mesh.geometry != GeometryType::Triangles {
                continue;
            }
            if let Some(filter) = sub_mesh_filter.as_deref_mut()
                && !filter(sub_mesh, origin, rotation)
            {
                continue;
            }
            targets.push(sub_mesh.clone());
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_host::{DirectoryFs, TextureLibrary};
    use lumen_texture::{DdsProbe, ImageFileWriter};

    struct Host {
        fs: DirectoryFs,
        textures: TextureLibrary,
        writer: ImageFileWriter,
    }

    impl Host {
        fn new() -> Self {
            Self {
                fs: DirectoryFs::default(),
                textures: TextureLibrary::new(),
                writer: ImageFileWriter::new("unused", "png"),
            }
        }

        fn services(&self) -> HostServices<'_> {
            HostServices {
                fs: &self.fs,
                textures: &self.textures,
                writer: &self.writer,
                probe: &DdsProbe,
            }
        }
    }

    #[test]
    fn test_settings_follow_config() {
        let mut config = Config::default();
        config.render.width = 640;
        config.render.height = 480;
        config.render.samples = Some(64);
        config.sky.angles = [10.0, 20.0, 30.0];
        config.lighting.max_transparency_bounces = 12;

        let host = Host::new();
        let scene = Scene::from_config(&config, host.services());
        let settings = scene.settings();
        assert_eq!(settings.samples, Some(64));
        assert_eq!(settings.sky_angles, Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(settings.max_transparency_bounces, 12);
        assert_eq!(settings.sky, None);
        assert_eq!((scene.camera().width, scene.camera().height), (640, 480));
    }

    #[test]
    fn test_setters() {
        let host = Host::new();
        let mut scene = Scene::new(SceneSettings::default(), TextureConfig::default(), host.services());
        scene.set_sky("/skies/dusk.hdr");
        scene.set_sky_strength(0.25);
        scene.set_emission_strength(3.0);
        scene.set_light_intensity_factor(0.5);
        scene.set_motion_blur_strength(1.0);
        scene.set_max_transparency_bounces(4);

        let settings = scene.settings();
        assert_eq!(settings.sky, Some(PathBuf::from("/skies/dusk.hdr")));
        assert_eq!(settings.sky_strength, 0.25);
        assert_eq!(settings.light_intensity_factor, 0.5);
        assert_eq!(settings.motion_blur_strength, 1.0);
        assert_eq!(settings.max_transparency_bounces, 4);
        assert_eq!(scene.shader_settings().emission_strength, 3.0);
    }

    #[test]
    fn test_arena_ids_are_sequential() {
        let host = Host::new();
        let mut scene = Scene::new(SceneSettings::default(), TextureConfig::default(), host.services());
        let a = scene.add_mesh(MeshBuffer::new("a", 0, 0, MeshFlags::default()));
        let b = scene.add_mesh(MeshBuffer::new("b", 0, 0, MeshFlags::default()));
        assert_eq!((a, b), (MeshId(0), MeshId(1)));

        let first = scene.add_object(b, Pose::IDENTITY);
        let second = scene.add_object(b, Pose::from_position(Vec3::X));
        assert_eq!((first, second), (ObjectId(0), ObjectId(1)));
        assert_eq!(scene.object(second).unwrap().mesh, b);
        assert_eq!(scene.mesh(b).unwrap().name, "b");
        assert!(scene.mesh(MeshId(2)).is_none());
    }

    #[test]
    fn test_shader_settings_track_camera_far() {
        let host = Host::new();
        let mut scene = Scene::new(SceneSettings::default(), TextureConfig::default(), host.services());
        scene.camera_mut().far = 250.0;
        assert_eq!(scene.shader_settings().far_z, 250.0);
    }
}
