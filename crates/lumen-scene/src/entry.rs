//! One-call entry points: build a scene from configuration and start the
//! render job.

use lumen_config::{Config, DeviceType, RenderMode};
use lumen_host::{Entity, HostWorld, Model};
use tracing::{info, warn};

use crate::error::RenderError;
use crate::job::{RenderJob, Renderer};
use crate::light::setup_light_sources;
use crate::populate::{EntityFilter, SceneView, initialize_from_host_scene};
use crate::scene::{HostServices, Scene};

/// Resolution, quality and device of an ambient-occlusion bake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AoBakeOptions {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub device: DeviceType,
}

impl Default for AoBakeOptions {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            samples: 20,
            device: DeviceType::Cpu,
        }
    }
}

/// Applies the configured sky. An override path replaces any sky picked up
/// from sky entities.
fn apply_sky_config(scene: &mut Scene<'_>, config: &Config) {
    if let Some(path) = config.sky.override_path.as_deref().filter(|p| !p.is_empty()) {
        scene.set_sky(path);
    }
    scene.set_sky_angles(config.sky.angles.into());
    scene.set_sky_strength(config.sky.strength);
}

/// Renders the host world as seen from `view`.
pub fn render_image(
    config: &Config,
    services: HostServices<'_>,
    world: &dyn HostWorld,
    view: &SceneView,
    entity_filter: Option<&EntityFilter<'_>>,
    renderer: impl Renderer,
) -> Result<RenderJob, RenderError> {
    let mut config = config.clone();
    if !config.render.render_mode.is_render_scene_mode() {
        warn!(
            "{:?} is not an image mode, rendering {:?} instead",
            config.render.render_mode,
            RenderMode::RenderImage
        );
        config.render.render_mode = RenderMode::RenderImage;
    }

    let mut scene = Scene::from_config(&config, services);
    initialize_from_host_scene(&mut scene, world, view, entity_filter, None);
    apply_sky_config(&mut scene, &config);
    scene.finalize(renderer)
}

/// Bakes ambient occlusion of the sub-meshes of `model` using
/// `material_index`, with the rest of the model as occluder.
pub fn bake_ambient_occlusion(
    config: &Config,
    services: HostServices<'_>,
    model: &Model,
    material_index: usize,
    options: AoBakeOptions,
    renderer: impl Renderer,
) -> Result<RenderJob, RenderError> {
    let mut config = config.clone();
    config.render.render_mode = RenderMode::BakeAmbientOcclusion;
    config.render.width = options.width;
    config.render.height = options.height;
    config.render.samples = Some(options.samples);
    config.render.device = options.device;

    let mut scene = Scene::from_config(&config, services);
    if scene.set_ao_bake_target(model, material_index).is_none() {
        warn!("No ambient occlusion target in model '{}'", model.name);
    }
    info!(
        "Baking ambient occlusion for '{}' at {}x{}",
        model.name, options.width, options.height
    );
    scene.finalize(renderer)
}

/// Bakes the diffuse lighting of `target` from the lights of `world`.
pub fn bake_lightmaps(
    config: &Config,
    services: HostServices<'_>,
    world: &dyn HostWorld,
    target: &dyn Entity,
    renderer: impl Renderer,
) -> Result<RenderJob, RenderError> {
    let mut config = config.clone();
    config.render.render_mode = RenderMode::BakeDiffuseLighting;

    let mut scene = Scene::from_config(&config, services);
    setup_light_sources(&mut scene, world, None);
    scene.set_lightmap_bake_target(target);
    apply_sky_config(&mut scene, &config);
    scene.finalize(renderer)
}
