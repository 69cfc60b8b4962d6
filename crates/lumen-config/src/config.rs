//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mode::{DeviceType, RenderMode, ShaderStyle};

/// Top-level scene build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Output and device settings.
    pub render: RenderConfig,
    /// Sky environment settings.
    pub sky: SkyConfig,
    /// Global lighting factors.
    pub lighting: LightingConfig,
    /// Shader selection settings.
    pub shading: ShadingConfig,
    /// Texture conversion paths.
    pub textures: TextureConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Render output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// What to produce.
    pub render_mode: RenderMode,
    /// Renderer device.
    pub device: DeviceType,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Samples per pixel (`None` = renderer default).
    pub samples: Option<u32>,
    /// Keep HDR colors in the output image.
    pub hdr_output: bool,
    /// Run the denoiser on the result.
    pub denoise: bool,
}

/// Sky configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkyConfig {
    /// Equirectangular sky image replacing whatever the scene provides.
    pub override_path: Option<String>,
    /// Sky rotation as pitch/yaw/roll in degrees.
    pub angles: [f32; 3],
    /// Sky light multiplier.
    pub strength: f32,
}

/// Global lighting factors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// Multiplier for emissive materials (0 disables emission maps).
    pub emission_strength: f32,
    /// Multiplier for all light sources.
    pub light_intensity_factor: f32,
    /// Transparency bounce limit.
    pub max_transparency_bounces: u32,
    /// Motion blur strength (0 = off).
    pub motion_blur_strength: f32,
}

/// Shader selection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShadingConfig {
    /// Shading style for full renders and lighting bakes.
    pub style: ShaderStyle,
    /// Emission factor applied to particles (0 = particles don't emit light).
    pub particle_light_emission_factor: f32,
}

/// Convention-based texture locations, relative to the asset roots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextureConfig {
    /// Directory holding renderer-native textures.
    pub materials_dir: String,
    /// Directory converted textures are written to.
    pub converted_dir: String,
    /// Container file extension the renderer reads.
    pub container_extension: String,
    /// Texture name (without extension) used when a texture is unusable.
    pub error_texture: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::RenderImage,
            device: DeviceType::Gpu,
            width: 1280,
            height: 720,
            samples: None,
            hdr_output: false,
            denoise: true,
        }
    }
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            override_path: None,
            angles: [0.0; 3],
            strength: 1.0,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            emission_strength: 1.0,
            light_intensity_factor: 1.0,
            max_transparency_bounces: 64,
            motion_blur_strength: 0.0,
        }
    }
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            style: ShaderStyle::Pbr,
            particle_light_emission_factor: 0.0,
        }
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            materials_dir: "materials".to_string(),
            converted_dir: "addons/converted/materials".to_string(),
            container_extension: "dds".to_string(),
            error_texture: "error".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for Lumen (`<config dir>/lumen`), if known.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lumen"))
}

const CONFIG_FILE: &str = "config.ron";

impl Config {
    /// Reads `<config_dir>/config.ron`, writing the defaults there first when
    /// the file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default scene config to {}", path.display());
            return Ok(config);
        }
        let config = Self::read(&path)?;
        log::info!("Scene config loaded from {}", path.display());
        Ok(config)
    }

    /// Writes the config as pretty RON to `<config_dir>/config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        let write_error = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(&path, text).map_err(write_error)
    }

    /// Re-reads the file; `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Scene config changed on disk");
        Ok(Some(fresh))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("max_transparency_bounces: 64"));
        assert!(ron_str.contains("container_extension: \"dds\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.render.render_mode = RenderMode::BakeAmbientOcclusion;
        config.sky.override_path = Some("skies/dusk.hdr".to_string());
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let ron_str = "(render: (width: 512), sky: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.render.width, 512);
        assert_eq!(config.render.height, 720);
        assert_eq!(config.lighting, LightingConfig::default());
        assert_eq!(config.textures, TextureConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.render.width = 512;
        config.render.height = 512;
        config.shading.style = ShaderStyle::Toon;
        config.lighting.emission_strength = 0.0;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.sky.strength = 4.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().sky.strength, 4.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path.ends_with("config.ron")));
    }

    #[test]
    fn test_reload_without_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::default().reload(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
