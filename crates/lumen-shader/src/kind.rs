//! Shader variants and the parameter groups they carry.

use std::path::PathBuf;

use glam::{Vec3, Vec4};
use lumen_host::AlphaMode;

/// Primary albedo map plus the optional blend layer.
#[derive(Clone, Debug, PartialEq)]
pub struct AlbedoLayers {
    pub map: PathBuf,
    /// Multiplier applied to the albedo color.
    pub color_factor: Option<Vec4>,
    /// Second albedo layer, blended in by vertex alpha.
    pub secondary: Option<PathBuf>,
}

impl AlbedoLayers {
    pub fn uses_vertex_alpha_blending(&self) -> bool {
        self.secondary.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlphaSettings {
    pub mode: AlphaMode,
    pub cutoff: f32,
}

/// Albedo and alpha; shared by every variant that samples albedo.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicShader {
    pub albedo: AlbedoLayers,
    pub alpha: AlphaSettings,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoughnessSettings {
    pub map: Option<PathBuf>,
    pub factor: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetalnessSettings {
    pub map: Option<PathBuf>,
    pub factor: Option<f32>,
}

/// Numerical subsurface scattering method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubsurfaceMethod {
    Cubic,
    Gaussian,
    Principled,
    Burley,
    RandomWalk,
    PrincipledRandomWalk,
}

impl SubsurfaceMethod {
    /// Map the host's method id.
    pub fn from_id(id: i32) -> Option<Self> {
        Some(match id {
            0 => Self::Cubic,
            1 => Self::Gaussian,
            2 => Self::Principled,
            3 => Self::Burley,
            4 => Self::RandomWalk,
            5 => Self::PrincipledRandomWalk,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subsurface {
    pub factor: Option<f32>,
    pub color: Option<Vec3>,
    pub method: Option<SubsurfaceMethod>,
    pub radius: Option<Vec3>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmissionSettings {
    /// Global emission multiplier. Zero disables the rest.
    pub intensity: f32,
    pub map: Option<PathBuf>,
    pub factor: Option<Vec3>,
    /// Emission is masked by the albedo alpha channel.
    pub from_albedo_alpha: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToonShader {
    pub base: BasicShader,
    pub normal_map: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GlassShader {
    pub albedo: AlbedoLayers,
    pub normal_map: Option<PathBuf>,
    pub roughness: RoughnessSettings,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PbrShader {
    pub base: BasicShader,
    /// Black is treated as transparent.
    pub additive_by_color: bool,
    pub normal_map: Option<PathBuf>,
    pub metalness: MetalnessSettings,
    pub roughness: RoughnessSettings,
    pub subsurface: Option<Subsurface>,
    pub emission: EmissionSettings,
    pub wrinkle_stretch_map: Option<PathBuf>,
    pub wrinkle_compress_map: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleShader {
    pub pbr: PbrShader,
    /// Particle tint, RGBA 0..=255.
    pub color: [u8; 4],
    pub additive_blend_by_color: bool,
}

/// The shader model of a [`ShaderInstance`](crate::ShaderInstance).
#[derive(Clone, Debug, PartialEq)]
pub enum ShaderKind {
    Albedo(BasicShader),
    Normal {
        base: BasicShader,
        normal_map: Option<PathBuf>,
    },
    Depth {
        base: BasicShader,
        far_z: f32,
    },
    Toon(ToonShader),
    Glass(GlassShader),
    Pbr(PbrShader),
    PbrParticle(ParticleShader),
}

impl ShaderKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Albedo(_) => "albedo",
            Self::Normal { .. } => "normal",
            Self::Depth { .. } => "depth",
            Self::Toon(_) => "toon",
            Self::Glass(_) => "glass",
            Self::Pbr(_) => "pbr",
            Self::PbrParticle(_) => "pbr_particle",
        }
    }

    pub fn albedo(&self) -> &AlbedoLayers {
        match self {
            Self::Albedo(b) | Self::Normal { base: b, .. } | Self::Depth { base: b, .. } => {
                &b.albedo
            }
            Self::Toon(t) => &t.base.albedo,
            Self::Glass(g) => &g.albedo,
            Self::Pbr(p) => &p.base.albedo,
            Self::PbrParticle(p) => &p.pbr.base.albedo,
        }
    }

    pub fn normal_map(&self) -> Option<&PathBuf> {
        match self {
            Self::Albedo(_) | Self::Depth { .. } => None,
            Self::Normal { normal_map, .. } => normal_map.as_ref(),
            Self::Toon(t) => t.normal_map.as_ref(),
            Self::Glass(g) => g.normal_map.as_ref(),
            Self::Pbr(p) => p.normal_map.as_ref(),
            Self::PbrParticle(p) => p.pbr.normal_map.as_ref(),
        }
    }

    /// Variants that sample a normal map.
    pub fn has_normal_input(&self) -> bool {
        !matches!(self, Self::Albedo(_) | Self::Depth { .. })
    }

    pub fn pbr(&self) -> Option<&PbrShader> {
        match self {
            Self::Pbr(p) => Some(p),
            Self::PbrParticle(p) => Some(&p.pbr),
            _ => None,
        }
    }
}
