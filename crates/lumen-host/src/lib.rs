//! Host-engine scene data consumed by the Lumen bridge.
//!
//! The bridge never owns the host's entity/component system. It reads a
//! snapshot of it through the types here: plain data for models, materials
//! and textures, and capability traits ([`Entity`], [`AnimatedComponent`],
//! [`EyeComponent`], [`ParticleSystem`]) whose optional accessors answer
//! "does this entity expose capability X". In-memory implementations
//! ([`EntityData`], [`ParticleSystemData`], [`WorldData`], [`TextureLibrary`],
//! [`DirectoryFs`]) back tests and offline tools.

mod component;
mod entity;
mod material;
mod model;
mod pose;
mod texture;
mod world;

pub use component::{
    LightComponent, LightKind, ModelComponent, Particle, ParticleAlphaMode, RenderComponent,
    RenderLayer, SkyCamera, VertexTransform,
};
pub use entity::{
    AnimatedComponent, Entity, EntityData, EyeComponent, ParticleSystem, ParticleSystemData,
};
pub use material::{AlphaMode, DataBlock, DataValue, Material, slots};
pub use model::{BodyGroup, Eyeball, GeometryType, Model, ModelMesh, SubMesh, Vertex};
pub use pose::Pose;
pub use texture::{HostTexture, ImageData, LoadState, PixelFormat, TextureImage, TextureRef};
pub use world::{
    AssetFs, DirectoryFs, HostWorld, TextureLibrary, TextureManager, VisLeaf, VisibilityTree,
    WorldData,
};
