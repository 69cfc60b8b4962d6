//! Configuration for Lumen scene builds.
//!
//! Provides the settings a scene build reads (render mode, sky, lighting,
//! shading style, texture conversion paths) persisted to disk as RON files,
//! CLI overrides via clap, and the small enums shared by every crate of the
//! bridge.

mod cli;
mod config;
mod error;
mod mode;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, LightingConfig, RenderConfig, ShadingConfig, SkyConfig, TextureConfig,
    default_config_dir,
};
pub use error::ConfigError;
pub use mode::{DeviceType, RenderMode, ShaderStyle};
