//! Scene population for the Lumen path tracer.
//!
//! A [`Scene`] is filled from the host world by
//! [`initialize_from_host_scene`] or the bake setups, then consumed by
//! [`Scene::finalize`], which hands an immutable [`FinalizedScene`] to a
//! [`Renderer`] on a worker thread and returns a [`RenderJob`] handle.
//!
//! Meshes are published once into an arena and referenced by [`MeshId`];
//! unanimated models without material overrides are shared between
//! entities through the model cache.

mod bake;
mod cache;
mod camera;
mod entry;
mod error;
mod frustum;
mod job;
mod light;
mod particles;
mod populate;
mod scene;
mod sky;

pub use bake::{LIGHTMAP_UV_SET, lightmap_uvs};
pub use cache::{ModelCache, ModelCacheEntry};
pub use camera::{Camera, CameraType, PanoramaType};
pub use entry::{AoBakeOptions, bake_ambient_occlusion, bake_lightmaps, render_image};
pub use error::RenderError;
pub use frustum::{Aabb, Frustum};
pub use job::{CancellationToken, FinalizedScene, JobControl, RenderJob, RenderOutput, Renderer};
pub use light::{Light, LightType, setup_light_sources};
pub use populate::{EntityFilter, SceneView, initialize_from_host_scene};
pub use scene::{
    AssembledMesh, HostServices, MeshFilter, MeshId, MeshSource, ObjectId, ObjectInstance, Scene,
    SceneSettings, SubMeshFilter,
};
pub use sky::sky_pose;
