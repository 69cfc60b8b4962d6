use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec3;
use lumen_config::{RenderMode, ShaderStyle};
use lumen_host::{
    AlphaMode, Entity, Material, Particle, ParticleAlphaMode, ParticleSystem, SubMesh, TextureRef,
    slots,
};
use lumen_texture::{PrepareFlags, TexturePreparer};
use tracing::debug;

use crate::eye::EyeUvHandler;
use crate::kind::{
    AlbedoLayers, AlphaSettings, BasicShader, EmissionSettings, GlassShader, MetalnessSettings,
    ParticleShader, PbrShader, RoughnessSettings, ShaderKind, Subsurface, SubsurfaceMethod,
    ToonShader,
};

const DEFAULT_ROUGHNESS: f32 = 0.5;
const WHITE: &str = "white";

/// Scene state the factory reads while building shaders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaderSettings {
    pub render_mode: RenderMode,
    /// Camera far plane, used by depth shaders.
    pub far_z: f32,
    pub emission_strength: f32,
    pub style: ShaderStyle,
    pub particle_light_emission_factor: f32,
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::RenderImage,
            far_z: 1000.0,
            emission_strength: 1.0,
            style: ShaderStyle::Pbr,
            particle_light_emission_factor: 0.0,
        }
    }
}

#[derive(Clone, Copy)]
pub struct ParticleContext<'a> {
    pub system: &'a dyn ParticleSystem,
    pub particle: &'a Particle,
}

/// Optional context of the geometry a shader is created for.
#[derive(Clone, Copy, Default)]
pub struct ShaderInfo<'a> {
    pub entity: Option<&'a dyn Entity>,
    pub sub_mesh: Option<&'a SubMesh>,
    pub particle: Option<ParticleContext<'a>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalMapSpace {
    Tangent,
    Object,
}

/// A configured shader bound to one mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderInstance {
    pub name: String,
    pub mesh_name: String,
    pub kind: ShaderKind,
    pub albedo_uv: Option<Arc<EyeUvHandler>>,
    pub emission_uv: Option<Arc<EyeUvHandler>>,
    pub normal_map_space: Option<NormalMapSpace>,
}

/// Builds [`ShaderInstance`]s from host materials.
pub struct ShaderFactory<'a> {
    textures: &'a TexturePreparer<'a>,
    settings: ShaderSettings,
}

impl<'a> ShaderFactory<'a> {
    pub fn new(textures: &'a TexturePreparer<'a>, settings: ShaderSettings) -> Self {
        Self { textures, settings }
    }

    pub fn settings(&self) -> &ShaderSettings {
        &self.settings
    }

    /// Create the shader for `material` on mesh `mesh_name`.
    ///
    /// Returns `None` when the material has no usable diffuse texture, or
    /// when the diffuse texture is an environment map.
    pub fn create_shader(
        &self,
        material: &Material,
        mesh_name: &str,
        info: &ShaderInfo<'_>,
    ) -> Option<ShaderInstance> {
        // Material texture references are only valid once pending loads land.
        self.textures.texture_manager().wait_for_textures();

        let diffuse_slot = if material.is_shader(slots::SKYBOX) {
            slots::SKYBOX
        } else {
            slots::ALBEDO_MAP
        };
        let diffuse_ref = material.texture(diffuse_slot);
        let diffuse = self
            .textures
            .prepare(diffuse_ref, PrepareFlags::ENV_MAP, None);
        let diffuse_path = diffuse.path?;
        if diffuse.env_map {
            debug!(
                "Material '{}' uses an environment map as diffuse, skipping",
                material.name
            );
            return None;
        }

        let secondary = if material.is_shader("pbr_blend") {
            self.prepare(material.texture(slots::ALBEDO_MAP2), None)
        } else {
            None
        };

        let mut albedo = AlbedoLayers {
            map: diffuse_path,
            color_factor: None,
            secondary,
        };
        let alpha = AlphaSettings {
            mode: material.alpha_mode,
            cutoff: material.alpha_cutoff,
        };

        let kind = match self.settings.render_mode {
            RenderMode::SceneAlbedo => ShaderKind::Albedo(BasicShader { albedo, alpha }),
            RenderMode::SceneNormals => ShaderKind::Normal {
                base: BasicShader { albedo, alpha },
                normal_map: self.normal_map(material),
            },
            RenderMode::SceneDepth => ShaderKind::Depth {
                base: BasicShader { albedo, alpha },
                far_z: self.settings.far_z,
            },
            _ => {
                albedo.color_factor = material.data.get_vector4("color_factor");
                if material.is_shader("glass") {
                    ShaderKind::Glass(GlassShader {
                        albedo,
                        normal_map: self.normal_map(material),
                        roughness: self.roughness(material),
                    })
                } else if self.settings.style == ShaderStyle::Toon {
                    ShaderKind::Toon(ToonShader {
                        base: BasicShader { albedo, alpha },
                        normal_map: self.normal_map(material),
                    })
                } else {
                    let pbr = self.pbr(material, BasicShader { albedo, alpha }, diffuse_ref, info);
                    match info.particle {
                        Some(ctx) => ShaderKind::PbrParticle(ParticleShader {
                            pbr,
                            color: ctx.particle.color,
                            additive_blend_by_color: ctx.system.alpha_mode()
                                == ParticleAlphaMode::AdditiveByColor,
                        }),
                        None => ShaderKind::Pbr(pbr),
                    }
                }
            }
        };

        let mut shader = ShaderInstance {
            name: format!("{mesh_name}_shader"),
            mesh_name: mesh_name.to_string(),
            kind,
            albedo_uv: None,
            emission_uv: None,
            normal_map_space: None,
        };

        if let (Some(entity), Some(sub_mesh)) = (info.entity, info.sub_mesh) {
            if material.is_shader("eye") {
                if let Some(handler) = eye_uv_handler(entity, sub_mesh) {
                    let handler = Arc::new(handler);
                    shader.albedo_uv = Some(handler.clone());
                    shader.emission_uv = Some(handler);
                } else {
                    debug!(
                        "No eyeball data for eye material '{}' on '{mesh_name}'",
                        material.name
                    );
                }
            }
            if shader.kind.has_normal_input() {
                shader.normal_map_space = Some(NormalMapSpace::Tangent);
            }
        }
        Some(shader)
    }

    fn prepare(&self, texture: Option<&TextureRef>, fallback: Option<&str>) -> Option<PathBuf> {
        self.textures
            .prepare(texture, PrepareFlags::NONE, fallback)
            .path
    }

    fn normal_map(&self, material: &Material) -> Option<PathBuf> {
        self.prepare(material.texture(slots::NORMAL_MAP), None)
    }

    fn rma_map(&self, material: &Material) -> Option<PathBuf> {
        self.prepare(material.texture(slots::RMA_MAP), Some(WHITE))
    }

    fn roughness(&self, material: &Material) -> RoughnessSettings {
        let mut factor = material.data.get_float("roughness_factor");
        if let Some(specular) = material.data.get_float("specular_factor") {
            let base = factor.unwrap_or(1.0);
            factor = Some(base * (1.0 - specular));
        }
        let map = self.rma_map(material);
        if map.is_some() && factor.is_none() {
            factor = Some(1.0);
        }
        RoughnessSettings {
            map,
            factor: factor.unwrap_or(DEFAULT_ROUGHNESS),
        }
    }

    fn pbr(
        &self,
        material: &Material,
        base: BasicShader,
        diffuse: Option<&TextureRef>,
        info: &ShaderInfo<'_>,
    ) -> PbrShader {
        let data = &material.data;
        let additive_by_color =
            data.get_bool("black_to_alpha") && base.alpha.mode != AlphaMode::Opaque;

        PbrShader {
            base,
            additive_by_color,
            normal_map: self.normal_map(material),
            metalness: MetalnessSettings {
                map: self.rma_map(material),
                factor: data.get_float("metalness_factor"),
            },
            roughness: self.roughness(material),
            subsurface: data.get_block("subsurface_scattering").map(|sss| Subsurface {
                factor: sss.get_float("factor"),
                color: sss.get_color_rgb("color"),
                method: sss.get_int("method").and_then(SubsurfaceMethod::from_id),
                radius: sss.get_vector("radius"),
            }),
            emission: self.emission(material, diffuse, info),
            wrinkle_stretch_map: self.prepare(material.texture(slots::WRINKLE_STRETCH_MAP), None),
            wrinkle_compress_map: self
                .prepare(material.texture(slots::WRINKLE_COMPRESS_MAP), None),
        }
    }

    fn emission(
        &self,
        material: &Material,
        diffuse: Option<&TextureRef>,
        info: &ShaderInfo<'_>,
    ) -> EmissionSettings {
        let mut emission = EmissionSettings {
            intensity: self.settings.emission_strength,
            map: None,
            factor: None,
            from_albedo_alpha: false,
        };
        if emission.intensity <= 0.0 {
            return emission;
        }

        let data = &material.data;
        let mut texture = material.texture(slots::EMISSION_MAP);
        let light_factor = self.settings.particle_light_emission_factor;
        if texture.is_none() && light_factor > 0.0 && info.particle.is_some() {
            texture = diffuse;
            emission.factor = Some(Vec3::splat(light_factor));
        }

        emission.map = self.prepare(texture, None);
        if emission.map.is_some() && data.get_bool("glow_alpha_only") {
            emission.from_albedo_alpha = true;
            let blend_scale = data.get_float("glow_blend_diffuse_scale").unwrap_or(1.0);
            let glow_scale = data.get_float("glow_scale").unwrap_or(1.0);
            emission.factor = Some(Vec3::splat(blend_scale * glow_scale + 1.0));
        }
        if let Some(factor) = data.get_vector("emission_factor") {
            emission.factor = Some(factor);
        }
        emission
    }
}

fn eye_uv_handler(entity: &dyn Entity, sub_mesh: &SubMesh) -> Option<EyeUvHandler> {
    let eye = entity.eye()?;
    let model = entity.model()?;
    let index = eye.find_eyeball_index(sub_mesh.skin_texture_index)?;
    let eyeball = model.eyeball(index)?;
    let dilation = eye.dilation(index)?;
    let (iris_proj_u, iris_proj_v) = eye.projection_vectors(index)?;
    Some(EyeUvHandler {
        iris_proj_u,
        iris_proj_v,
        dilation,
        max_dilation: eyeball.max_dilation_factor,
        iris_uv_radius: eyeball.iris_uv_radius,
    })
}
