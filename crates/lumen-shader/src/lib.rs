//! Shader resolution for the path tracer.
//!
//! [`ShaderFactory`] turns a host material into a [`ShaderInstance`]: one of
//! the [`ShaderKind`] variants picked by an ordered predicate chain over the
//! render mode, the material's shader identifier and the particle context,
//! with textures resolved through `lumen-texture`.

mod eye;
mod factory;
mod kind;

pub use eye::EyeUvHandler;
pub use factory::{
    NormalMapSpace, ParticleContext, ShaderFactory, ShaderInfo, ShaderInstance, ShaderSettings,
};
pub use kind::{
    AlbedoLayers, AlphaSettings, BasicShader, EmissionSettings, GlassShader, MetalnessSettings,
    ParticleShader, PbrShader, RoughnessSettings, ShaderKind, Subsurface, SubsurfaceMethod,
    ToonShader,
};
