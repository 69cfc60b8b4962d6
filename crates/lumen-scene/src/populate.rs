//! Population of a scene from the host's world.

use glam::{Mat4, Quat, Vec3};
use lumen_host::{Entity, HostWorld, ModelMesh, RenderLayer, SkyCamera};
use tracing::{debug, info};

use crate::frustum::Aabb;
use crate::light::setup_light_sources;
use crate::scene::{MeshFilter, Scene};

/// Entity filter: `entity -> keep`.
pub type EntityFilter<'f> = dyn Fn(&dyn Entity) -> bool + 'f;

/// Camera the host scene is rendered from.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneView {
    pub cam_pos: Vec3,
    pub cam_rot: Quat,
    pub view_projection: Mat4,
    pub near: f32,
    pub far: f32,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    /// Drop geometry outside the camera leaf's potentially visible set.
    pub cull_outside_pvs: bool,
}

impl SceneView {
    /// A view at `cam_pos` with `cam_rot`, deriving the view-projection matrix
    /// from the given lens at `aspect_ratio`.
    pub fn new(cam_pos: Vec3, cam_rot: Quat, fov_deg: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let view = (Mat4::from_translation(cam_pos) * Mat4::from_quat(cam_rot)).inverse();
        let proj = Mat4::perspective_rh(fov_deg.to_radians(), aspect_ratio, near, far);
        Self {
            cam_pos,
            cam_rot,
            view_projection: proj * view,
            near,
            far,
            fov_deg,
            cull_outside_pvs: false,
        }
    }
}

/// Fills `scene` with everything `world` shows from `view`: lights, camera,
/// world and skybox renderables, particle systems and the 3D skybox.
pub fn initialize_from_host_scene(
    scene: &mut Scene<'_>,
    world: &dyn HostWorld,
    view: &SceneView,
    entity_filter: Option<&EntityFilter<'_>>,
    light_filter: Option<&EntityFilter<'_>>,
) {
    setup_light_sources(scene, world, light_filter);

    let camera = scene.camera_mut();
    camera.position = view.cam_pos;
    camera.rotation = view.cam_rot;
    camera.near = view.near;
    camera.far = view.far;
    camera.set_fov_degrees(view.fov_deg);

    let tree = world.visibility_tree().filter(|_| view.cull_outside_pvs);
    let leaf = tree.and_then(|t| t.find_leaf(view.cam_pos));
    if view.cull_outside_pvs && leaf.is_none() {
        debug!("Camera is outside the visibility tree, PVS culling disabled");
    }

    let entities = world.entities();
    let sky_cameras: Vec<SkyCamera> = entities
        .iter()
        .filter_map(|e| e.sky_camera().copied())
        .collect();
    let accepted = |entity: &dyn Entity| entity_filter.is_none_or(|f| f(entity));

    let mut added = 0usize;
    for &entity in &entities {
        let (Some(render), Some(_)) = (entity.render_component(), entity.model_component()) else {
            continue;
        };
        // With a sky camera, skybox-layer entities go through the 3D skybox.
        let layer_drawn = match render.layer {
            RenderLayer::World => true,
            RenderLayer::Skybox => sky_cameras.is_empty(),
            RenderLayer::View | RenderLayer::None => false,
        };
        let origin = entity.pose().position;
        if !layer_drawn || !render.should_draw(origin, view.cam_pos) || !accepted(entity) {
            continue;
        }

        let mut mesh_filter: Option<Box<MeshFilter<'_>>> = None;
        if let (Some(tree), Some(leaf)) = (tree, leaf)
            && !render.exempt_from_occlusion_culling
        {
            if entity.is_world() {
                mesh_filter = Some(Box::new(move |mesh: &ModelMesh, _: Vec3, _: Quat| {
                    // Meshes without a cluster are not world geometry.
                    mesh.reference_id
                        .is_none_or(|cluster| tree.is_cluster_visible(leaf.cluster, cluster))
                }));
            } else {
                // Entities are culled whole, which keeps them shareable.
                let (min, max) = render.render_bounds;
                let bounds = Aabb::new(min, max).translated(origin);
                if !bounds.intersects(&Aabb::new(leaf.min_visible, leaf.max_visible)) {
                    continue;
                }
            }
        }
        if scene
            .add_entity(entity, None, mesh_filter.as_deref(), None, "")
            .is_some()
        {
            added += 1;
        }
    }

    let mut particle_systems = 0usize;
    for &entity in &entities {
        let Some(system) = entity.particle_system() else {
            continue;
        };
        if scene
            .add_particle_system(system, view.cam_pos, &view.view_projection, view.near, view.far)
            .is_some()
        {
            particle_systems += 1;
        }
    }

    if !sky_cameras.is_empty() {
        let sky_entities: Vec<&dyn Entity> = entities
            .iter()
            .copied()
            .filter(|&e| accepted(e))
            .collect();
        for sky in &sky_cameras {
            scene.add_3d_skybox(sky, &sky_entities, view.cam_pos);
        }
    }

    info!(
        "Scene populated: {added} entities, {particle_systems} particle systems, {} lights, {} objects",
        scene.lights().len(),
        scene.objects().len()
    );
}
